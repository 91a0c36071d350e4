use std::collections::HashSet;

use thiserror::Error;

use unitsvc_core::{ClassId, ServiceError};

/// The set of classes a principal belongs to, fetched fresh for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMembership {
    classes: HashSet<ClassId>,
}

impl ClassMembership {
    pub fn new(classes: impl IntoIterator<Item = ClassId>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn contains(&self, class_id: ClassId) -> bool {
        self.classes.contains(&class_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassId> for ClassMembership {
    fn from_iter<T: IntoIterator<Item = ClassId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("principal is not a member of class {0}")]
    NotMember(ClassId),
}

/// Denials surface as `NotFound` so inaccessible classes and units stay
/// indistinguishable from absent ones.
impl From<AuthzError> for ServiceError {
    fn from(_: AuthzError) -> Self {
        ServiceError::NotFound
    }
}

/// Authorize access to a class-scoped resource.
///
/// - No IO
/// - No panics
/// - Membership in the class is the sole predicate
pub fn authorize_class(membership: &ClassMembership, class_id: ClassId) -> Result<(), AuthzError> {
    if membership.contains(class_id) {
        Ok(())
    } else {
        Err(AuthzError::NotMember(class_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    #[test]
    fn member_is_authorized() {
        let class = ClassId::new();
        let membership = ClassMembership::new([ClassId::new(), class]);
        assert_eq!(authorize_class(&membership, class), Ok(()));
    }

    #[test]
    fn denial_is_reported_as_not_found() {
        let class = ClassId::new();
        let err = authorize_class(&ClassMembership::default(), class).unwrap_err();
        assert_eq!(err, AuthzError::NotMember(class));
        assert_eq!(ServiceError::from(err), ServiceError::NotFound);
    }

    proptest! {
        #[test]
        fn non_members_are_always_denied(
            enrolled in proptest::collection::vec(any::<u128>(), 0..16),
            target in any::<u128>(),
        ) {
            prop_assume!(!enrolled.contains(&target));
            let membership: ClassMembership = enrolled
                .iter()
                .map(|raw| ClassId::from_uuid(Uuid::from_u128(*raw)))
                .collect();
            let target = ClassId::from_uuid(Uuid::from_u128(target));
            prop_assert!(authorize_class(&membership, target).is_err());
        }
    }
}
