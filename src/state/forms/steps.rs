//! Step registry for the formation wizard

use super::model::FormValue;
use super::path::{FieldPath, OwnerField, SignatureField};

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    EntityInformation,
    OwnerInformation,
    PreparerInformation,
    Attestation,
}

/// Static description of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub step: Step,
    /// 1-based position
    pub index: usize,
    pub title: &'static str,
    /// Field paths validated before leaving the step
    pub fields: &'static [FieldPath],
    /// Step after this one, `None` for the terminal step
    pub next: Option<Step>,
}

impl StepDescriptor {
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }
}

/// Transition table: step → validated fields → next step
pub static STEPS: [StepDescriptor; 4] = [
    StepDescriptor {
        step: Step::EntityInformation,
        index: 1,
        title: "Entity Information",
        fields: &[
            FieldPath::EntityName,
            FieldPath::EntityAddress,
            FieldPath::ServiceProductOffered,
            FieldPath::EntityType,
            FieldPath::Expedite,
        ],
        next: Some(Step::OwnerInformation),
    },
    StepDescriptor {
        step: Step::OwnerInformation,
        index: 2,
        title: "Owner Information",
        fields: &[FieldPath::Owners],
        next: Some(Step::PreparerInformation),
    },
    StepDescriptor {
        step: Step::PreparerInformation,
        index: 3,
        title: "Preparer Information",
        fields: &[FieldPath::PreparerAcknowledged],
        next: Some(Step::Attestation),
    },
    StepDescriptor {
        step: Step::Attestation,
        index: 4,
        title: "Attestation",
        fields: &[FieldPath::Signatures],
        next: None,
    },
];

pub const TOTAL_STEPS: usize = 4;

impl Step {
    pub fn descriptor(&self) -> &'static StepDescriptor {
        &STEPS[self.index() - 1]
    }

    /// 1-based position of the step
    pub fn index(&self) -> usize {
        match self {
            Self::EntityInformation => 1,
            Self::OwnerInformation => 2,
            Self::PreparerInformation => 3,
            Self::Attestation => 4,
        }
    }

    /// Step at a 1-based position, clamped to the valid range
    pub fn from_index(index: usize) -> Self {
        STEPS[index.clamp(1, TOTAL_STEPS) - 1].step
    }

    pub fn title(&self) -> &'static str {
        self.descriptor().title
    }

    pub fn fields(&self) -> &'static [FieldPath] {
        self.descriptor().fields
    }

    pub fn next(&self) -> Option<Step> {
        self.descriptor().next
    }

    /// Previous step, clamped at the first one
    pub fn prev(&self) -> Step {
        Step::from_index(self.index().saturating_sub(1))
    }

    pub fn is_first(&self) -> bool {
        self.index() == 1
    }

    pub fn is_terminal(&self) -> bool {
        self.descriptor().is_terminal()
    }

    /// Fields the user edits on this step, in display order.
    ///
    /// Owner and signature steps grow with the collections they show.
    pub fn editable_fields(&self, value: &FormValue) -> Vec<FieldPath> {
        match self {
            Self::EntityInformation => self.fields().to_vec(),
            Self::OwnerInformation => value
                .owners
                .iter()
                .enumerate()
                .flat_map(|(index, _)| {
                    let extra: &[OwnerField] = if index == 0 {
                        &OwnerField::RESPONSIBLE_PARTY
                    } else {
                        &[]
                    };
                    OwnerField::COMMON
                        .iter()
                        .chain(extra.iter())
                        .map(move |field| FieldPath::Owner(index, *field))
                        .collect::<Vec<_>>()
                })
                .collect(),
            Self::PreparerInformation => vec![FieldPath::PreparerAcknowledged],
            Self::Attestation => (0..value.signatures.len())
                .flat_map(|index| {
                    SignatureField::ALL
                        .into_iter()
                        .map(move |field| FieldPath::Signature(index, field))
                })
                .collect(),
        }
    }
}
