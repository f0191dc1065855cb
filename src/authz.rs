//! Board Authorization
//!
//! Every mutation asks `authorize` first. Decisions mirror what the backend
//! enforces so that a denied action never produces a doomed request.

use thiserror::Error;

use crate::models::{Member, Role, User};

/// What the acting user wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewBoard,
    RenameBoard,
    /// Create, rename or reorder columns
    EditColumns,
    DeleteColumn,
    CreateTask,
    /// Move, rename, re-prioritize, set deadline/description, manage files
    EditTask,
    DeleteTask { creator: Option<u32> },
    Comment,
    DeleteComment { author: u32 },
    RemoveMember { user_id: u32 },
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("you are not signed in")]
    Anonymous,
    #[error("you are not a member of this board")]
    NotMember,
    #[error("requires the {} role or higher", .0.label())]
    RequiresRole(Role),
    #[error("only the author can do this")]
    NotAuthor,
    #[error("only the task creator or a board admin can do this")]
    NotCreator,
    #[error("the board owner cannot be removed")]
    OwnerIsPermanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Who is acting on which board
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub user: Option<&'a User>,
    pub owner_id: u32,
    pub members: &'a [Member],
}

impl AccessContext<'_> {
    /// Effective role: ownership beats any member entry
    pub fn role(&self) -> Option<Role> {
        let user = self.user?;
        if user.id == self.owner_id {
            return Some(Role::Owner);
        }
        self.members.iter().find(|m| m.user_id == user.id).map(|m| m.role)
    }
}

fn rank(role: Role) -> u8 {
    match role {
        Role::Viewer => 0,
        Role::Editor => 1,
        Role::Admin => 2,
        Role::Owner => 3,
    }
}

fn at_least(role: Role, required: Role) -> Decision {
    if rank(role) >= rank(required) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RequiresRole(required))
    }
}

pub fn authorize(ctx: &AccessContext<'_>, permission: Permission) -> Decision {
    let Some(user) = ctx.user else {
        return Decision::Deny(DenyReason::Anonymous);
    };
    let Some(role) = ctx.role() else {
        return Decision::Deny(DenyReason::NotMember);
    };

    match permission {
        Permission::ViewBoard | Permission::Comment | Permission::Chat => Decision::Allow,
        Permission::RenameBoard => at_least(role, Role::Owner),
        Permission::EditColumns | Permission::CreateTask | Permission::EditTask => at_least(role, Role::Editor),
        Permission::DeleteColumn => at_least(role, Role::Admin),
        Permission::DeleteTask { creator } => {
            if creator == Some(user.id) || rank(role) >= rank(Role::Admin) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotCreator)
            }
        }
        Permission::DeleteComment { author } => {
            if author == user.id {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotAuthor)
            }
        }
        Permission::RemoveMember { user_id } => {
            if user_id == ctx.owner_id {
                Decision::Deny(DenyReason::OwnerIsPermanent)
            } else {
                at_least(role, Role::Owner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{member, user};

    fn members() -> Vec<Member> {
        vec![
            member(2, "bob", Role::Editor),
            member(3, "carol", Role::Viewer),
            member(4, "dave", Role::Admin),
        ]
    }

    fn decide(user_id: Option<u32>, permission: Permission) -> Decision {
        let members = members();
        let acting = user_id.map(|id| user(id, "someone"));
        let ctx = AccessContext {
            user: acting.as_ref(),
            owner_id: 1,
            members: &members,
        };
        authorize(&ctx, permission)
    }

    #[test]
    fn test_anonymous_and_strangers_are_denied() {
        assert_eq!(decide(None, Permission::ViewBoard), Decision::Deny(DenyReason::Anonymous));
        assert_eq!(decide(Some(99), Permission::Chat), Decision::Deny(DenyReason::NotMember));
    }

    #[test]
    fn test_owner_can_do_everything_but_remove_self() {
        assert!(decide(Some(1), Permission::RenameBoard).is_allowed());
        assert!(decide(Some(1), Permission::DeleteColumn).is_allowed());
        assert!(decide(Some(1), Permission::RemoveMember { user_id: 2 }).is_allowed());
        assert_eq!(
            decide(Some(1), Permission::RemoveMember { user_id: 1 }),
            Decision::Deny(DenyReason::OwnerIsPermanent)
        );
    }

    #[test]
    fn test_viewer_is_read_only_but_may_talk() {
        assert_eq!(
            decide(Some(3), Permission::EditTask),
            Decision::Deny(DenyReason::RequiresRole(Role::Editor))
        );
        assert!(decide(Some(3), Permission::Comment).is_allowed());
        assert!(decide(Some(3), Permission::Chat).is_allowed());
    }

    #[test]
    fn test_editor_edits_tasks_but_not_columns_deletion() {
        assert!(decide(Some(2), Permission::EditTask).is_allowed());
        assert!(decide(Some(2), Permission::EditColumns).is_allowed());
        assert_eq!(
            decide(Some(2), Permission::DeleteColumn),
            Decision::Deny(DenyReason::RequiresRole(Role::Admin))
        );
        assert!(decide(Some(4), Permission::DeleteColumn).is_allowed());
    }

    #[test]
    fn test_task_deletion_requires_creator_or_admin() {
        assert!(decide(Some(2), Permission::DeleteTask { creator: Some(2) }).is_allowed());
        assert_eq!(
            decide(Some(2), Permission::DeleteTask { creator: Some(1) }),
            Decision::Deny(DenyReason::NotCreator)
        );
        assert!(decide(Some(4), Permission::DeleteTask { creator: Some(1) }).is_allowed());
    }

    #[test]
    fn test_comment_deletion_is_author_only() {
        assert!(decide(Some(3), Permission::DeleteComment { author: 3 }).is_allowed());
        assert_eq!(
            decide(Some(1), Permission::DeleteComment { author: 3 }),
            Decision::Deny(DenyReason::NotAuthor)
        );
    }

    #[test]
    fn test_owner_role_wins_over_member_entry() {
        let members = vec![member(1, "alice", Role::Viewer)];
        let alice = user(1, "alice");
        let ctx = AccessContext {
            user: Some(&alice),
            owner_id: 1,
            members: &members,
        };
        assert_eq!(ctx.role(), Some(Role::Owner));
    }
}
