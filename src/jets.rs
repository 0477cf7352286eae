use crate::event::Jet;

/// Jet multiplicity and b-tag multiplicity of one jet collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct JetCounts {
    pub jets: usize,
    pub b_tagged: usize,
}

impl JetCounts {
    pub fn classify(jets: &[Jet]) -> Self {
        Self {
            jets: jets.len(),
            b_tagged: jets.iter().filter(|jet| jet.b_tagged).count(),
        }
    }
}
