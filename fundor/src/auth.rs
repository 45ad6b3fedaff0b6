//! Principals and permission classes consulted while building a schema.

use std::collections::BTreeSet;

use http::Method;

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::view::ViewInstance;

/// The user a schema is being generated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub is_superuser: bool,
    pub is_authenticated: bool,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_authenticated: true,
            ..Self::default()
        }
    }

    pub fn superuser(username: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::user(username)
        }
    }

    pub fn with_perm(mut self, perm: impl Into<String>) -> Self {
        self.permissions.insert(perm.into());
        self
    }

    /// Superusers hold every permission; empty codenames are always held.
    pub fn has_perm(&self, perm: &str) -> bool {
        perm.is_empty() || self.is_superuser || self.permissions.contains(perm)
    }
}

/// The inbound request a schema is generated for, scoped to one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub principal: Principal,
    pub method: Method,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            method: Method::GET,
        }
    }

    /// Clones the request as if it had been made with `method`.
    pub fn for_method(&self, method: &Method) -> Self {
        Self {
            principal: self.principal.clone(),
            method: method.clone(),
        }
    }
}

/// A permission class declared by a handler.
pub trait Permission: Send + Sync {
    /// Permission codenames the principal must hold for `method`. The default
    /// requires nothing.
    fn required_permissions(
        &self,
        _method: &Method,
        _entity: Option<&Entity>,
    ) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Live permission hook. Denial is reported as an error whose kind is a
    /// visibility denial.
    fn has_permission(&self, _request: &RequestContext, _view: &ViewInstance) -> Result<()> {
        Ok(())
    }
}

pub struct AllowAny;

impl Permission for AllowAny {}

pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, request: &RequestContext, _view: &ViewInstance) -> Result<()> {
        if request.principal.is_authenticated {
            Ok(())
        } else {
            Err(Error::permission_denied(
                "Authentication credentials were not provided.",
            ))
        }
    }
}

/// Maps write methods to `<app_label>.<action>_<model>` codenames.
pub struct ModelPermissions;

impl ModelPermissions {
    fn action_for(method: &Method) -> Option<&'static str> {
        match method.as_str() {
            "POST" => Some("add"),
            "PUT" | "PATCH" => Some("change"),
            "DELETE" => Some("delete"),
            _ => None,
        }
    }
}

impl Permission for ModelPermissions {
    fn required_permissions(
        &self,
        method: &Method,
        entity: Option<&Entity>,
    ) -> Result<Vec<String>> {
        let entity = entity.ok_or_else(|| {
            Error::misconfigured("ModelPermissions requires a handler with a backing entity")
        })?;

        Ok(Self::action_for(method)
            .map(|action| {
                vec![format!(
                    "{}.{}_{}",
                    entity.app_label,
                    action,
                    entity.model_name()
                )]
            })
            .unwrap_or_default())
    }

    fn has_permission(&self, request: &RequestContext, view: &ViewInstance) -> Result<()> {
        if !request.principal.is_authenticated {
            return Err(Error::permission_denied(
                "Authentication credentials were not provided.",
            ));
        }
        let required = self.required_permissions(&request.method, view.entity())?;
        if required.iter().all(|p| request.principal.has_perm(p)) {
            Ok(())
        } else {
            Err(Error::permission_denied(
                "You do not have permission to perform this action.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Entity {
        Entity::new("Book", "library")
    }

    #[test]
    fn test_principal_has_perm() {
        let user = Principal::user("ann").with_perm("library.add_book");
        assert!(user.has_perm("library.add_book"));
        assert!(!user.has_perm("library.delete_book"));
        assert!(user.has_perm(""));

        let admin = Principal::superuser("root");
        assert!(admin.has_perm("anything.at_all"));
    }

    #[test]
    fn test_anonymous_is_not_authenticated() {
        let anon = Principal::anonymous();
        assert!(!anon.is_authenticated);
        assert!(anon.permissions.is_empty());
    }

    #[test]
    fn test_request_for_method() {
        let request = RequestContext::new(Principal::user("ann"));
        let cloned = request.for_method(&Method::DELETE);
        assert_eq!(cloned.method, Method::DELETE);
        assert_eq!(cloned.principal.username, "ann");
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn test_model_permissions_codenames() {
        let entity = book();
        let perms = ModelPermissions;
        assert_eq!(
            perms.required_permissions(&Method::POST, Some(&entity)).unwrap(),
            vec!["library.add_book"]
        );
        assert_eq!(
            perms.required_permissions(&Method::PATCH, Some(&entity)).unwrap(),
            vec!["library.change_book"]
        );
        assert_eq!(
            perms.required_permissions(&Method::DELETE, Some(&entity)).unwrap(),
            vec!["library.delete_book"]
        );
        assert!(perms
            .required_permissions(&Method::GET, Some(&entity))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_model_permissions_without_entity_is_misconfigured() {
        let err = ModelPermissions
            .required_permissions(&Method::GET, None)
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Misconfigured);
    }
}
