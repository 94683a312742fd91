pub mod approval_flow;
pub mod audit;
pub mod escalation_policy;
pub mod event;
pub mod registration;
