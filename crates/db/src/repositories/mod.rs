pub mod approval_flow_repo;
pub mod audit_repo;
pub mod escalation_policy_repo;
pub mod event_repo;
pub mod registration_repo;

pub use approval_flow_repo::ApprovalFlowRepo;
pub use audit_repo::AuditLogRepo;
pub use escalation_policy_repo::EscalationPolicyRepo;
pub use event_repo::EventRepo;
pub use registration_repo::RegistrationRepo;
