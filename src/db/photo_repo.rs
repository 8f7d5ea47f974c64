// src/db/photo_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::photos::{Album, CreateAlbumPayload, Photo, PhotoOrder, UpdateAlbumPayload},
};

#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Álbuns
    // ---

    pub async fn create_album<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateAlbumPayload,
    ) -> Result<Album, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let album = sqlx::query_as::<_, Album>(
            r#"
            INSERT INTO albums (tenant_id, title, description, event_date, price_per_photo, is_published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref())
        .bind(payload.event_date)
        .bind(payload.price_per_photo)
        .bind(payload.is_published)
        .fetch_one(executor)
        .await?;

        Ok(album)
    }

    /// `published_only` esconde os rascunhos de quem não é da equipe.
    pub async fn list_albums(&self, tenant_id: Uuid, published_only: bool) -> Result<Vec<Album>, AppError> {
        let albums = sqlx::query_as::<_, Album>(
            r#"
            SELECT * FROM albums
            WHERE tenant_id = $1 AND (NOT $2 OR is_published)
            ORDER BY event_date DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    pub async fn find_album<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Album>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let album = sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(album)
    }

    pub async fn update_album<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateAlbumPayload,
    ) -> Result<Option<Album>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let album = sqlx::query_as::<_, Album>(
            r#"
            UPDATE albums SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                event_date = COALESCE($5, event_date),
                price_per_photo = COALESCE($6, price_per_photo),
                is_published = COALESCE($7, is_published),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.title.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.event_date)
        .bind(payload.price_per_photo)
        .bind(payload.is_published)
        .fetch_optional(executor)
        .await?;

        Ok(album)
    }

    // ---
    // Fotos
    // ---

    pub async fn insert_photo<'e, E>(
        &self,
        executor: E,
        photo_id: Uuid,
        tenant_id: Uuid,
        album_id: Uuid,
        original_key: &str,
        preview_key: &str,
        file_name: &str,
        width: i32,
        height: i32,
    ) -> Result<Photo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (id, tenant_id, album_id, original_key, preview_key, file_name, width, height)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(photo_id)
        .bind(tenant_id)
        .bind(album_id)
        .bind(original_key)
        .bind(preview_key)
        .bind(file_name)
        .bind(width)
        .bind(height)
        .fetch_one(executor)
        .await?;

        Ok(photo)
    }

    pub async fn list_photos(&self, tenant_id: Uuid, album_id: Uuid) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE tenant_id = $1 AND album_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    // Só devolve as fotos que pertencem ao álbum
    pub async fn find_photos_in_album<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        album_id: Uuid,
        photo_ids: &[Uuid],
    ) -> Result<Vec<Photo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE tenant_id = $1 AND album_id = $2 AND id = ANY($3)
            "#,
        )
        .bind(tenant_id)
        .bind(album_id)
        .bind(photo_ids)
        .fetch_all(executor)
        .await?;

        Ok(photos)
    }

    // ---
    // Pedidos
    // ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        album_id: Uuid,
        buyer_id: Uuid,
        total_amount: Decimal,
    ) -> Result<PhotoOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PhotoOrder>(
            r#"
            INSERT INTO photo_orders (tenant_id, album_id, buyer_id, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(album_id)
        .bind(buyer_id)
        .bind(total_amount)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn add_order_items<'e, E>(&self, executor: E, order_id: Uuid, photo_ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO photo_order_items (order_id, photo_id)
            SELECT $1, UNNEST($2::UUID[])
            "#,
        )
        .bind(order_id)
        .bind(photo_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PhotoOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PhotoOrder>(
            "SELECT * FROM photo_orders WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    // Link público de download: o pedido é achado só pelo id, o token autoriza
    pub async fn find_order_by_id(&self, id: Uuid) -> Result<Option<PhotoOrder>, AppError> {
        let order = sqlx::query_as::<_, PhotoOrder>("SELECT * FROM photo_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn list_orders(&self, tenant_id: Uuid, buyer_id: Option<Uuid>) -> Result<Vec<PhotoOrder>, AppError> {
        let orders = sqlx::query_as::<_, PhotoOrder>(
            r#"
            SELECT * FROM photo_orders
            WHERE tenant_id = $1 AND ($2::UUID IS NULL OR buyer_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn order_photos<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<Photo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT p.* FROM photo_order_items i
            JOIN photos p ON p.id = i.photo_id
            WHERE i.order_id = $1
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(photos)
    }

    pub async fn album_title<'e, E>(&self, executor: E, album_id: Uuid) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title: String = sqlx::query_scalar("SELECT title FROM albums WHERE id = $1")
            .bind(album_id)
            .fetch_one(executor)
            .await?;

        Ok(title)
    }

    /// Marca como pago apenas se ainda estiver pendente.
    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        download_token: &str,
        download_expires_at: DateTime<Utc>,
    ) -> Result<Option<PhotoOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PhotoOrder>(
            r#"
            UPDATE photo_orders SET
                payment_status = 'pago',
                download_token = $3,
                download_expires_at = $4,
                paid_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND payment_status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(download_token)
        .bind(download_expires_at)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    pub async fn cancel_order<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Option<PhotoOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PhotoOrder>(
            r#"
            UPDATE photo_orders SET payment_status = 'cancelado', updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND payment_status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }
}
