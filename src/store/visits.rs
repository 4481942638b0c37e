use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use super::{Change, Error, VisitFeed};
use crate::models::Visit;

const VISIT_COLUMNS: &str = "id, city, state, user_id, created_at";

/// Visit records and the live feed of changes to them.
#[derive(Clone)]
pub struct VisitStore {
    pool: SqlitePool,
    changes: broadcast::Sender<Change>,
    // Held from stamping to publishing so feed order matches commit order.
    writes: Arc<Mutex<()>>,
}

impl VisitStore {
    /// `feed_capacity` is how many unread changes a slow feed subscriber may
    /// fall behind before it is cut off.
    pub fn new(pool: SqlitePool, feed_capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(feed_capacity.max(1));
        Self {
            pool,
            changes,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Check the fields a client must supply.
    pub fn validate(visit: &Visit) -> Result<(), Error> {
        if visit.city.trim().is_empty() {
            return Err(Error::MissingField("city"));
        }
        if visit.state.trim().is_empty() {
            return Err(Error::MissingField("state"));
        }
        Ok(())
    }

    /// Insert a new visit.
    ///
    /// City and state are trimmed, the state is uppercased, and a fresh id
    /// and timestamp are assigned, replacing anything the caller put there.
    /// On success `visit` holds the stored record.
    pub async fn add(&self, visit: &mut Visit) -> Result<(), Error> {
        Self::validate(visit)?;
        if visit.user.trim().is_empty() {
            return Err(Error::MissingField("user"));
        }

        let mut stored = Visit {
            city: visit.city.trim().to_string(),
            state: visit.state.trim().to_uppercase(),
            ..visit.clone()
        };

        let _write = self.writes.lock().await;
        stored.assign_identity();

        sqlx::query("INSERT INTO visits (id, city, state, user_id, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&stored.id)
            .bind(&stored.city)
            .bind(&stored.state)
            .bind(&stored.user)
            .bind(&stored.timestamp)
            .execute(&self.pool)
            .await
            .map_err(Error::store("unable to add visit"))?;

        tracing::debug!(visit_id = %stored.id, user = %stored.user, "visit added");
        self.publish(Change {
            old_val: None,
            new_val: Some(stored.clone()),
        });

        *visit = stored;
        Ok(())
    }

    /// Remove a visit by id. Removing an id that does not exist succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let _write = self.writes.lock().await;
        let removed: Option<Visit> = sqlx::query_as(&format!(
            "DELETE FROM visits WHERE id = ? RETURNING {VISIT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store("unable to delete visit"))?;

        if let Some(visit) = removed {
            tracing::debug!(visit_id = %visit.id, "visit deleted");
            self.publish(Change {
                old_val: Some(visit),
                new_val: None,
            });
        }
        Ok(())
    }

    /// A user's visits, newest first, sliced to `[start, start + limit)`.
    pub async fn get_visits(&self, user: &str, start: u32, limit: u32) -> Result<Vec<Visit>, Error> {
        sqlx::query_as(&format!(
            "SELECT {VISIT_COLUMNS} FROM visits WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(user)
        .bind(i64::from(limit))
        .bind(i64::from(start))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store("unable to get visits"))
    }

    /// Distinct state codes the user has visited, in no particular order.
    pub async fn get_states(&self, user: &str) -> Result<Vec<String>, Error> {
        sqlx::query_scalar("SELECT DISTINCT state FROM visits WHERE user_id = ?")
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::store("unable to get visits"))
    }

    /// Distinct city names the user has visited, in no particular order.
    pub async fn get_cities(&self, user: &str) -> Result<Vec<String>, Error> {
        sqlx::query_scalar("SELECT DISTINCT city FROM visits WHERE user_id = ?")
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::store("unable to get visits"))
    }

    /// Subscribe to visits created from now on.
    pub fn stream(&self) -> Result<VisitFeed, Error> {
        if self.pool.is_closed() {
            return Err(Error::store("unable to open visits change-feed")(
                sqlx::Error::PoolClosed,
            ));
        }
        Ok(VisitFeed::new(self.changes.subscribe()))
    }

    /// Number of open feeds.
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn publish(&self, change: Change) {
        if self.changes.send(change).is_err() {
            tracing::trace!("no visit feed subscribers");
        }
    }
}
