use approx::assert_relative_eq;
use ttbar_fiducial::{
    pid, Analysis, AnalysisConfig, Event, FourMomentum, Jet, Level, Particle, Rejection, Selector,
};

const WEIGHT: f64 = 0.75;

fn muon() -> Particle {
    Particle::new(
        pid::MUON,
        FourMomentum::from_pt_eta_phi_m(40.0, 0.0, 0.0, 0.105),
        WEIGHT,
    )
}

/// Four jets at ΔR = 0.5 from the muon, the first two b-tagged.
fn jets() -> Vec<Jet> {
    [(0.5, 0.0), (0.0, 0.5), (-0.5, 0.0), (0.0, -0.5)]
        .iter()
        .enumerate()
        .map(|(i, &(eta, phi))| {
            Jet::new(
                FourMomentum::from_pt_eta_phi_m(60.0 - i as f64, eta, phi, 5.0),
                i < 2,
            )
        })
        .collect()
}

fn signal_event() -> Event {
    let photon = Particle::new(
        pid::PHOTON,
        FourMomentum::from_pt_eta_phi_m(30.0, 0.05, 0.0, 0.0),
        WEIGHT,
    );
    Event {
        detector_particles: vec![muon()],
        truth_particles: vec![muon(), photon],
        detector_jets: jets(),
        particle_jets: jets(),
        top_leptons: vec![muon()],
        missing_momentum: FourMomentum::from_pt_eta_phi_m(50.0, 0.0, 3.0, 0.0),
        weight: WEIGHT,
    }
}

#[test]
fn test_signal_event_passes_both_levels() {
    let selection = Selector::default().select(&signal_event());
    for level in [Level::Detector, Level::Particle] {
        let verdict = selection.verdict(level);
        assert!(verdict.passed(), "{level}: {:?}", verdict.rejections);
        assert_eq!(verdict.jets.jets, 4);
        assert_eq!(verdict.jets.b_tagged, 2);
        assert_eq!(verdict.n_leptons, 1);
        assert!(verdict.isolation.unwrap().isolated);
    }
    assert!(selection.lepton_counts_agree);
}

#[test]
fn test_jet_near_lepton_fails_isolation() {
    let mut event = signal_event();
    event.detector_jets[3] = Jet::new(FourMomentum::from_pt_eta_phi_m(57.0, 0.0, -0.3, 5.0), false);
    let selection = Selector::default().select(&event);

    let detector = &selection.detector;
    assert!(!detector.passed());
    assert_eq!(detector.rejections, vec![Rejection::LeptonJetOverlap { jets: 1 }]);
    let iso = detector.isolation.unwrap();
    assert!(!iso.isolated);
    assert_relative_eq!(iso.closest_jet.unwrap(), 0.3, epsilon = 1e-9);
    assert_eq!(detector.jets.jets, 4);
    assert_eq!(detector.jets.b_tagged, 2);
    assert_eq!(detector.n_leptons, 1);

    assert!(selection.particle.passed());
}

#[test]
fn test_levels_are_evaluated_independently() {
    let mut event = signal_event();
    event.detector_jets.pop();
    let selection = Selector::default().select(&event);
    assert!(selection.particle.passed());
    assert!(!selection.detector.passed());
    assert!(selection.detector.rejected_by("jet_multiplicity"));
    assert!(selection.detector.isolation.is_some());

    let mut event = signal_event();
    event.particle_jets[0].b_tagged = false;
    let selection = Selector::default().select(&event);
    assert!(selection.detector.passed());
    assert_eq!(
        selection.particle.rejections,
        vec![Rejection::BTagMultiplicity {
            found: 1,
            required: 2
        }]
    );
}

#[test]
fn test_event_without_leptons_is_rejected_quietly() {
    let event = Event {
        detector_jets: jets(),
        particle_jets: jets(),
        weight: WEIGHT,
        ..Default::default()
    };
    let selection = Selector::default().select(&event);
    for level in [Level::Detector, Level::Particle] {
        let verdict = selection.verdict(level);
        assert_eq!(
            verdict.rejections,
            vec![Rejection::LeptonMultiplicity {
                found: 0,
                required: 1
            }]
        );
        assert!(verdict.isolation.is_none());
        assert!(verdict.mtw.is_none());
    }
    assert!(selection.dressed_leptons.is_empty());

    let empty = Selector::default().select(&Event::new(1.0));
    assert!(!empty.detector.passed());
    assert!(!empty.particle.passed());
}

#[test]
fn test_particle_level_counts_top_leptons_not_dressed_leptons() {
    let mut event = signal_event();
    event.top_leptons.clear();
    let selection = Selector::default().select(&event);
    assert_eq!(selection.dressed_leptons.len(), 1);
    assert!(selection.particle.rejected_by("lepton_multiplicity"));
    assert!(selection.detector.passed());
    assert!(!selection.lepton_counts_agree);
}

#[test]
fn test_selection_is_deterministic_and_dresses_leptons() {
    let event = signal_event();
    let selector = Selector::default();
    let first = selector.select(&event);
    let second = selector.select(&event.clone());
    assert_eq!(first, second);

    let dressed = &first.dressed_leptons[0];
    assert_eq!(dressed.photons, vec![0]);
    assert_eq!(dressed.pid(), pid::MUON);
    assert!(dressed.pt() > muon().pt());
}

#[test]
fn test_inclusive_yield_reproduces_cross_section() {
    let events: Vec<Event> = (0..1000).map(|_| signal_event()).collect();
    let analysis = Analysis::new(AnalysisConfig::default()).unwrap();
    let (summary, _) = analysis.run(&events, 252.89).unwrap();
    assert_relative_eq!(summary.yields.inclusive, 252.89, max_relative = 1e-9);
    assert_relative_eq!(summary.yields.fiducial, 252.89, max_relative = 1e-9);
    assert_relative_eq!(summary.yields.sum_of_weights, 750.0, max_relative = 1e-9);
    assert_eq!(summary.particle_passed.events, 1000);
}
