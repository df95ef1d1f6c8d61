use super::domain::SubmissionRecord;
use super::identity::{Principal, Role};

/// Rejections raised before a request reaches the workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("onboarding must be completed before using the dashboard")]
    OnboardingIncomplete,
    #[error("{actual} accounts cannot perform this action (requires {required})")]
    RoleNotPermitted { required: &'static str, actual: &'static str },
    #[error("account has no department assigned")]
    MissingDepartment,
    #[error("department {caller} cannot act on records of {record}")]
    DepartmentMismatch { caller: String, record: String },
}

/// Role and department checks mirroring the protected dashboard routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessBoundary;

impl AccessBoundary {
    /// Ensure the principal finished onboarding and holds `role`.
    pub fn require_role(&self, principal: &Principal, role: Role) -> Result<(), AccessError> {
        if !principal.onboarding_complete {
            return Err(AccessError::OnboardingIncomplete);
        }
        if principal.role != role {
            return Err(AccessError::RoleNotPermitted {
                required: role.label(),
                actual: principal.role.label(),
            });
        }
        Ok(())
    }

    /// Staff scope: the department the principal may see and review.
    pub fn staff_department<'a>(&self, principal: &'a Principal) -> Result<&'a str, AccessError> {
        self.require_role(principal, Role::Staff)?;
        department_of(principal)
    }

    /// Any onboarded principal with a department (used for exports and views).
    pub fn department<'a>(&self, principal: &'a Principal) -> Result<&'a str, AccessError> {
        if !principal.onboarding_complete {
            return Err(AccessError::OnboardingIncomplete);
        }
        department_of(principal)
    }

    pub fn require_reviewer(
        &self,
        principal: &Principal,
        record: &SubmissionRecord,
    ) -> Result<(), AccessError> {
        let department = self.staff_department(principal)?;
        if !record.belongs_to(department) {
            return Err(AccessError::DepartmentMismatch {
                caller: department.to_string(),
                record: record.content.department.clone(),
            });
        }
        Ok(())
    }
}

fn department_of(principal: &Principal) -> Result<&str, AccessError> {
    principal
        .department
        .as_deref()
        .filter(|department| !department.trim().is_empty())
        .ok_or(AccessError::MissingDepartment)
}
