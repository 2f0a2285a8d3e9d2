//! Owner permissions

use crate::foundation::ids::PlayerId;

/// Permission level of a player relative to one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OwnerState {
    /// May use the object but not edit it
    User,
    /// Owner, or anyone when the object has no owner
    Owner,
    /// Server operator
    Admin,
}

impl OwnerState {
    /// Resolve the state of `player` for an object owned by `owner`
    pub fn resolve(owner: Option<PlayerId>, player: Option<PlayerId>, is_admin: bool) -> Self {
        if is_admin {
            return Self::Admin;
        }
        match owner {
            None => Self::Owner,
            Some(owner) if player == Some(owner) => Self::Owner,
            Some(_) => Self::User,
        }
    }

    /// Owners and admins may edit the object
    pub fn can_edit(self) -> bool {
        self >= Self::Owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_state_resolution() {
        let owner = PlayerId(1);
        let stranger = PlayerId(2);

        assert_eq!(OwnerState::resolve(None, Some(stranger), false), OwnerState::Owner);
        assert_eq!(OwnerState::resolve(Some(owner), Some(owner), false), OwnerState::Owner);
        assert_eq!(OwnerState::resolve(Some(owner), Some(stranger), false), OwnerState::User);
        assert_eq!(OwnerState::resolve(Some(owner), None, false), OwnerState::User);
        assert_eq!(OwnerState::resolve(Some(owner), Some(stranger), true), OwnerState::Admin);
        assert!(!OwnerState::User.can_edit());
        assert!(OwnerState::Admin.can_edit());
    }
}
