//! Order production statuses and transitions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Cutting,
    Stitching,
    Finishing,
    QualityCheck,
    Ready,
    Delivered,
    Cancelled,
}

/// Production pipeline in order; `Cancelled` sits outside it.
const PIPELINE: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Cutting,
    OrderStatus::Stitching,
    OrderStatus::Finishing,
    OrderStatus::QualityCheck,
    OrderStatus::Ready,
    OrderStatus::Delivered,
];

impl OrderStatus {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "cutting" => Ok(Self::Cutting),
            "stitching" => Ok(Self::Stitching),
            "finishing" => Ok(Self::Finishing),
            "quality_check" => Ok(Self::QualityCheck),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!("Invalid order status '{s}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cutting => "cutting",
            Self::Stitching => "stitching",
            Self::Finishing => "finishing",
            Self::QualityCheck => "quality_check",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    fn pipeline_index(&self) -> Option<usize> {
        PIPELINE.iter().position(|s| s == self)
    }

    /// Orders move forward through the pipeline (skipping steps is allowed,
    /// going back is not) and may be cancelled until delivered.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() || *self == target {
            return false;
        }
        if target == Self::Cancelled {
            return true;
        }
        match (self.pipeline_index(), target.pipeline_index()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot change order status from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_are_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cutting));
        assert!(OrderStatus::Stitching.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn backward_and_same_moves_are_rejected() {
        assert!(!OrderStatus::Finishing.can_transition_to(OrderStatus::Cutting));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Ready));
        assert!(validate_transition(OrderStatus::Ready, OrderStatus::Pending).is_err());
    }

    #[test]
    fn cancel_until_delivered() {
        assert!(OrderStatus::QualityCheck.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(
            OrderStatus::parse("quality_check").unwrap(),
            OrderStatus::QualityCheck
        );
        assert!(OrderStatus::parse("shipped").is_err());
    }
}
