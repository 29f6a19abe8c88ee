use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seatline_core::models::{
    BookingQuantity, Event, EventDetail, EventWithHost, HostContact, HostName, NewEvent,
};
use seatline_core::repository::EventRepository;
use seatline_core::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::storage_error;

pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const EVENT_COLUMNS: &str =
    "e.id, e.title, e.description, e.date, e.location, e.capacity, e.price, e.image, e.host_id, e.created_at";

#[derive(sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub price: f64,
    pub image: Option<String>,
    pub host_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            location: row.location,
            capacity: row.capacity,
            price: row.price,
            image: row.image,
            host_id: row.host_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventHostRow {
    #[sqlx(flatten)]
    event: EventRow,
    host_name: String,
    host_email: String,
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create_event(&self, host_id: Uuid, event: NewEvent) -> CoreResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (id, title, description, date, location, capacity, price, image, host_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, date, location, capacity, price, image, host_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.price)
        .bind(&event.image)
        .bind(host_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.into())
    }

    async fn list_events(&self) -> CoreResult<Vec<EventWithHost>> {
        let query = format!(
            "SELECT {}, u.name AS host_name, u.email AS host_email \
             FROM events e JOIN users u ON u.id = e.host_id \
             ORDER BY e.date ASC, e.created_at ASC",
            EVENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, EventHostRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|row| EventWithHost {
                event: row.event.into(),
                host: HostContact {
                    name: row.host_name,
                    email: row.host_email,
                },
            })
            .collect())
    }

    async fn get_event(&self, id: Uuid) -> CoreResult<Option<EventDetail>> {
        let query = format!(
            "SELECT {}, u.name AS host_name, u.email AS host_email \
             FROM events e JOIN users u ON u.id = e.host_id \
             WHERE e.id = $1",
            EVENT_COLUMNS
        );

        let row = sqlx::query_as::<_, EventHostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let bookings = sqlx::query_as::<_, (i32,)>(
            "SELECT quantity FROM bookings WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(|(quantity,)| BookingQuantity { quantity })
        .collect();

        Ok(Some(EventDetail::new(
            row.event.into(),
            HostName { name: row.host_name },
            bookings,
        )))
    }
}
