use crate::consts::{BRIDGE_CONFIRMATION_TIMEOUT, TRANSFER_CONFIRMATION_TIMEOUT};
use log::debug;
use serde::Serialize;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Transfer,
    Swap,
    Bridge,
}

impl OperationKind {
    /// Default bound on waiting for the transaction to be mined. Bridges get
    /// longer since the source leg often waits on the aggregator's relayer.
    pub fn confirmation_timeout(self) -> Duration {
        match self {
            OperationKind::Bridge => BRIDGE_CONFIRMATION_TIMEOUT,
            OperationKind::Transfer | OperationKind::Swap => TRANSFER_CONFIRMATION_TIMEOUT,
        }
    }
}

/// Progress of one operation. `Approving` only occurs when an allowance had to
/// be raised first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStage {
    Building,
    Estimating,
    Approving,
    Signing,
    Broadcasting,
    Pending,
    Confirmed,
    Failed,
}

impl OperationStage {
    pub fn can_advance_to(self, next: OperationStage) -> bool {
        use OperationStage::*;
        matches!(
            (self, next),
            (Building, Estimating)
                | (Estimating, Approving)
                | (Estimating, Signing)
                | (Approving, Signing)
                | (Signing, Broadcasting)
                | (Broadcasting, Pending)
                | (Pending, Confirmed)
                | (Pending, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStage::Confirmed | OperationStage::Failed)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct StageTracker {
    kind: OperationKind,
    stages: Vec<OperationStage>,
}

impl StageTracker {
    pub(crate) fn start(kind: OperationKind) -> Self {
        debug!("{kind:?}: {:?}", OperationStage::Building);
        StageTracker {
            kind,
            stages: vec![OperationStage::Building],
        }
    }

    pub(crate) fn kind(&self) -> OperationKind {
        self.kind
    }

    pub(crate) fn current(&self) -> OperationStage {
        *self.stages.last().unwrap_or(&OperationStage::Building)
    }

    pub(crate) fn advance(&mut self, next: OperationStage) {
        debug_assert!(
            self.current().can_advance_to(next),
            "{:?}: illegal transition {:?} -> {next:?}",
            self.kind,
            self.current()
        );
        debug!("{:?}: {:?} -> {next:?}", self.kind, self.current());
        self.stages.push(next);
    }

    pub(crate) fn into_stages(self) -> Vec<OperationStage> {
        self.stages
    }
}
