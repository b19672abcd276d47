use crate::error::{db_error, AppResult};
use crate::models::{ClosetItem, InspoImage, Outfit, PackingList, StylePreferences};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Database trait over the hosted store. Every operation is scoped by the
/// authenticated user id; rows belonging to other users are never visible.
#[async_trait]
pub trait WardrobeDb: Send + Sync + 'static {
    async fn list_closet_items(&self, user_id: &str) -> AppResult<Vec<ClosetItem>>;
    async fn add_closet_item(&self, item: &ClosetItem) -> AppResult<()>;
    async fn delete_closet_item(&self, user_id: &str, item_id: Uuid) -> AppResult<()>;

    async fn save_outfit(&self, outfit: &Outfit) -> AppResult<()>;
    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>>;

    async fn save_packing_list(&self, list: &PackingList) -> AppResult<()>;
    async fn list_packing_lists(&self, user_id: &str) -> AppResult<Vec<PackingList>>;

    async fn save_inspo_image(&self, image: &InspoImage) -> AppResult<()>;
    async fn list_inspo_images(&self, user_id: &str) -> AppResult<Vec<InspoImage>>;

    async fn get_style_preferences(&self, user_id: &str) -> AppResult<Option<StylePreferences>>;
    async fn set_style_preferences(
        &self,
        user_id: &str,
        preferences: &StylePreferences,
    ) -> AppResult<()>;
}

/// REST implementation against the hosted Supabase project (PostgREST
/// conventions: `?user_id=eq.<id>` filters, Prefer headers for upserts)
pub struct SupabaseDb {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseDb {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        user_id: &str,
    ) -> AppResult<Vec<T>> {
        let response = self
            .client
            .get(self.table_url(table))
            .query(&[("user_id", format!("eq.{}", user_id)), ("select", "*".to_string())])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| db_error(&format!("Failed to query {}: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(db_error(&format!(
                "Failed to query {}: HTTP {} - {}",
                table, status, error_body
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| db_error(&format!("Failed to parse {} rows: {}", table, e)))
    }

    async fn insert<T: serde::Serialize>(&self, table: &str, row: &T) -> AppResult<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| db_error(&format!("Failed to insert into {}: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(db_error(&format!(
                "Failed to insert into {}: HTTP {} - {}",
                table, status, error_body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl WardrobeDb for SupabaseDb {
    async fn list_closet_items(&self, user_id: &str) -> AppResult<Vec<ClosetItem>> {
        self.select("closet_items", user_id).await
    }

    async fn add_closet_item(&self, item: &ClosetItem) -> AppResult<()> {
        self.insert("closet_items", item).await
    }

    async fn delete_closet_item(&self, user_id: &str, item_id: Uuid) -> AppResult<()> {
        let response = self
            .client
            .delete(self.table_url("closet_items"))
            .query(&[
                ("id", format!("eq.{}", item_id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| db_error(&format!("Failed to delete closet item: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(db_error(&format!(
                "Failed to delete closet item: HTTP {}",
                status
            )));
        }

        Ok(())
    }

    async fn save_outfit(&self, outfit: &Outfit) -> AppResult<()> {
        self.insert("outfits", outfit).await
    }

    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>> {
        self.select("outfits", user_id).await
    }

    async fn save_packing_list(&self, list: &PackingList) -> AppResult<()> {
        self.insert("packing_lists", list).await
    }

    async fn list_packing_lists(&self, user_id: &str) -> AppResult<Vec<PackingList>> {
        self.select("packing_lists", user_id).await
    }

    async fn save_inspo_image(&self, image: &InspoImage) -> AppResult<()> {
        self.insert("inspo_images", image).await
    }

    async fn list_inspo_images(&self, user_id: &str) -> AppResult<Vec<InspoImage>> {
        self.select("inspo_images", user_id).await
    }

    async fn get_style_preferences(&self, user_id: &str) -> AppResult<Option<StylePreferences>> {
        let rows: Vec<Value> = self.select("users", user_id).await?;
        let preferences = rows
            .first()
            .and_then(|row| row.get("style_preferences"))
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());
        Ok(preferences)
    }

    async fn set_style_preferences(
        &self,
        user_id: &str,
        preferences: &StylePreferences,
    ) -> AppResult<()> {
        let row = serde_json::json!({
            "user_id": user_id,
            "style_preferences": preferences,
        });

        let response = self
            .client
            .post(self.table_url("users"))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| db_error(&format!("Failed to upsert preferences: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(db_error(&format!(
                "Failed to upsert preferences: HTTP {}",
                status
            )));
        }

        Ok(())
    }
}

/// In-memory implementation of the database (for testing and local use)
#[derive(Default)]
pub struct InMemoryDb {
    closet_items: RwLock<Vec<ClosetItem>>,
    outfits: RwLock<Vec<Outfit>>,
    packing_lists: RwLock<Vec<PackingList>>,
    inspo_images: RwLock<Vec<InspoImage>>,
    preferences: RwLock<HashMap<String, StylePreferences>>,
}

#[async_trait]
impl WardrobeDb for InMemoryDb {
    async fn list_closet_items(&self, user_id: &str) -> AppResult<Vec<ClosetItem>> {
        let items = self.closet_items.read().await;
        Ok(items
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_closet_item(&self, item: &ClosetItem) -> AppResult<()> {
        self.closet_items.write().await.push(item.clone());
        Ok(())
    }

    async fn delete_closet_item(&self, user_id: &str, item_id: Uuid) -> AppResult<()> {
        self.closet_items
            .write()
            .await
            .retain(|i| !(i.user_id == user_id && i.id == item_id));
        Ok(())
    }

    async fn save_outfit(&self, outfit: &Outfit) -> AppResult<()> {
        self.outfits.write().await.push(outfit.clone());
        Ok(())
    }

    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>> {
        let outfits = self.outfits.read().await;
        Ok(outfits
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_packing_list(&self, list: &PackingList) -> AppResult<()> {
        self.packing_lists.write().await.push(list.clone());
        Ok(())
    }

    async fn list_packing_lists(&self, user_id: &str) -> AppResult<Vec<PackingList>> {
        let lists = self.packing_lists.read().await;
        Ok(lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_inspo_image(&self, image: &InspoImage) -> AppResult<()> {
        self.inspo_images.write().await.push(image.clone());
        Ok(())
    }

    async fn list_inspo_images(&self, user_id: &str) -> AppResult<Vec<InspoImage>> {
        let images = self.inspo_images.read().await;
        Ok(images
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_style_preferences(&self, user_id: &str) -> AppResult<Option<StylePreferences>> {
        let preferences = self.preferences.read().await;
        Ok(preferences.get(user_id).cloned())
    }

    async fn set_style_preferences(
        &self,
        user_id: &str,
        preferences: &StylePreferences,
    ) -> AppResult<()> {
        self.preferences
            .write()
            .await
            .insert(user_id.to_string(), preferences.clone());
        Ok(())
    }
}
