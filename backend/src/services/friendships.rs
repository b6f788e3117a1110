use std::sync::Arc;

use crate::db::{FriendshipStore, StoreError, UserDirectory};
use crate::errors::FriendshipError;
use crate::models::{Friendship, FriendshipStatus, User, UserId};
use crate::utils::pagination::{PageRequest, Pagination};

const UNBLOCKED: [FriendshipStatus; 3] = [
    FriendshipStatus::Pending,
    FriendshipStatus::Accepted,
    FriendshipStatus::Declined,
];

/// Whether a receiver's `allows_friend_requests` preference is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendRequestPolicy {
    pub enforce_receiver_preference: bool,
}

impl Default for FriendRequestPolicy {
    fn default() -> Self {
        Self { enforce_receiver_preference: true }
    }
}

/// Owns the friend/block state machine between pairs of users.
#[derive(Clone)]
pub struct FriendshipService {
    users: Arc<dyn UserDirectory>,
    friendships: Arc<dyn FriendshipStore>,
    policy: FriendRequestPolicy,
}

impl FriendshipService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        friendships: Arc<dyn FriendshipStore>,
        policy: FriendRequestPolicy,
    ) -> Self {
        Self { users, friendships, policy }
    }

    pub async fn send_request(&self, initiator: UserId, receiver: UserId) -> Result<(), FriendshipError> {
        if initiator == receiver {
            return Err(FriendshipError::SelfRelation);
        }

        let existing = self.friendships.find_between(initiator, receiver).await?;
        if let Some(record) = &existing {
            match record.status {
                FriendshipStatus::Blocked => {
                    return Err(FriendshipError::Blocked { initiator, receiver });
                }
                FriendshipStatus::Accepted => {
                    return Err(FriendshipError::AlreadyRelated { initiator, receiver });
                }
                // The other side already asked us, so this request is an answer.
                FriendshipStatus::Pending if record.receiver == initiator => {
                    return self.accept_request(record.initiator, initiator).await;
                }
                FriendshipStatus::Pending => {
                    return Err(FriendshipError::DuplicateRequest { initiator, receiver });
                }
                FriendshipStatus::Declined => {}
            }
        }

        self.require_user(initiator).await?;
        let target = self.require_user(receiver).await?;
        if self.policy.enforce_receiver_preference && !target.allows_friend_requests {
            return Err(FriendshipError::RequestsDisabled(receiver));
        }

        let request = Friendship::request(initiator, receiver);
        if existing.is_some() {
            if !self.friendships.replace(&request, FriendshipStatus::Declined).await? {
                return Err(self.moved_on(initiator, receiver).await?);
            }
            tracing::info!(initiator, receiver, "declined friend request reopened");
            return Ok(());
        }

        match self.friendships.insert(&request).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(self.moved_on(initiator, receiver).await?),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(initiator, receiver, "friend request sent");
        Ok(())
    }

    /// `receiver` is the acting user answering `initiator`'s request.
    pub async fn accept_request(&self, initiator: UserId, receiver: UserId) -> Result<(), FriendshipError> {
        self.answer(initiator, receiver, FriendshipStatus::Accepted).await?;
        tracing::info!(initiator, receiver, "friend request accepted");
        Ok(())
    }

    /// Declined records are kept, which lets either side request again later.
    pub async fn decline_request(&self, initiator: UserId, receiver: UserId) -> Result<(), FriendshipError> {
        self.answer(initiator, receiver, FriendshipStatus::Declined).await?;
        tracing::info!(initiator, receiver, "friend request declined");
        Ok(())
    }

    pub async fn block_user(&self, blocker: UserId, target: UserId) -> Result<(), FriendshipError> {
        if blocker == target {
            return Err(FriendshipError::SelfBlock);
        }

        match self.friendships.find_between(blocker, target).await? {
            Some(record) if record.status == FriendshipStatus::Blocked => {
                return Err(FriendshipError::AlreadyBlocked { target });
            }
            Some(_) => self.block_existing(blocker, target).await?,
            None => {
                self.require_user(target).await?;
                match self.friendships.insert(&Friendship::blocked(blocker, target)).await {
                    Ok(()) => {}
                    // A record for this pair appeared in the meantime; block that one instead.
                    Err(StoreError::Conflict) => self.block_existing(blocker, target).await?,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        tracing::info!(blocker, target, "user blocked");
        Ok(())
    }

    /// The record between the two users in either direction, if any.
    pub async fn fetch_status(&self, a: UserId, b: UserId) -> Result<Option<Friendship>, FriendshipError> {
        Ok(self.friendships.find_between(a, b).await?)
    }

    pub async fn list_friends(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<User>, Pagination), FriendshipError> {
        let (ids, total) = self.friendships.list_friends(user, page).await?;
        let users = self.resolve_users(&ids).await?;
        Ok((users, Pagination::new(page, total)))
    }

    pub async fn list_pending_incoming(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<User>, Pagination), FriendshipError> {
        let (ids, total) = self.friendships.list_incoming(user, page).await?;
        let users = self.resolve_users(&ids).await?;
        Ok((users, Pagination::new(page, total)))
    }

    /// Moves a pending request addressed to `receiver` to `outcome`.
    async fn answer(&self, initiator: UserId, receiver: UserId, outcome: FriendshipStatus) -> Result<(), FriendshipError> {
        self.pending_addressed_to(initiator, receiver).await?;
        let answered = self
            .friendships
            .update_status(initiator, receiver, &[FriendshipStatus::Pending], outcome)
            .await?;
        if !answered {
            return Err(FriendshipError::NotPending);
        }
        Ok(())
    }

    async fn block_existing(&self, blocker: UserId, target: UserId) -> Result<(), FriendshipError> {
        let blocked = self
            .friendships
            .update_status(blocker, target, &UNBLOCKED, FriendshipStatus::Blocked)
            .await?;
        if !blocked {
            return Err(FriendshipError::AlreadyBlocked { target });
        }
        Ok(())
    }

    /// The error for a send whose write lost to a concurrent change of the pair's record.
    async fn moved_on(&self, initiator: UserId, receiver: UserId) -> Result<FriendshipError, FriendshipError> {
        let status = self.friendships.find_between(initiator, receiver).await?.map(|f| f.status);
        Ok(match status {
            Some(FriendshipStatus::Blocked) => FriendshipError::Blocked { initiator, receiver },
            Some(FriendshipStatus::Accepted) => FriendshipError::AlreadyRelated { initiator, receiver },
            _ => FriendshipError::DuplicateRequest { initiator, receiver },
        })
    }

    async fn pending_addressed_to(&self, initiator: UserId, receiver: UserId) -> Result<Friendship, FriendshipError> {
        let record = self
            .friendships
            .find_between(initiator, receiver)
            .await?
            .filter(|f| f.status == FriendshipStatus::Pending)
            .ok_or(FriendshipError::NotPending)?;

        if record.receiver != receiver {
            return Err(FriendshipError::NotAuthorized);
        }
        Ok(record)
    }

    async fn require_user(&self, id: UserId) -> Result<User, FriendshipError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(FriendshipError::UserNotFound(id))
    }

    async fn resolve_users(&self, ids: &[UserId]) -> Result<Vec<User>, FriendshipError> {
        let mut users = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.users.get_by_id(id).await? {
                Some(user) => users.push(user),
                None => tracing::warn!(user_id = id, "relationship references a missing user"),
            }
        }
        Ok(users)
    }
}
