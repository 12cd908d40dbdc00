// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SuggestionError;
use crate::http::HttpClient;
use crate::library::SuggestedFolder;

/// A named group of podcasts proposed as a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSuggestion {
    pub name: String,
    pub podcasts: Vec<String>,
}

/// Source of folder suggestions for a set of subscriptions
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn get_suggestions(
        &self,
        subscribed_podcast_ids: &[String],
    ) -> Result<Vec<FolderSuggestion>, SuggestionError>;
}

#[async_trait]
impl<T: SuggestionService + ?Sized> SuggestionService for Arc<T> {
    async fn get_suggestions(
        &self,
        subscribed_podcast_ids: &[String],
    ) -> Result<Vec<FolderSuggestion>, SuggestionError> {
        (**self).get_suggestions(subscribed_podcast_ids).await
    }
}

#[derive(Debug, Serialize)]
struct SuggestionRequest<'a> {
    uuids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    folders: Vec<FolderSuggestion>,
}

/// Suggestion service speaking JSON over HTTP
#[derive(Clone)]
pub struct ServerSuggestionService<C: HttpClient> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> ServerSuggestionService<C> {
    pub fn new(client: C, endpoint: &str) -> Result<Self, SuggestionError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl<C: HttpClient> SuggestionService for ServerSuggestionService<C> {
    async fn get_suggestions(
        &self,
        subscribed_podcast_ids: &[String],
    ) -> Result<Vec<FolderSuggestion>, SuggestionError> {
        let url = self.endpoint.as_str();
        let body = serde_json::to_vec(&SuggestionRequest {
            uuids: subscribed_podcast_ids,
        })?;

        let response =
            self.client
                .post_json(url, body)
                .await
                .map_err(|e| SuggestionError::HttpFailed {
                    url: url.to_string(),
                    source: e,
                })?;

        if !(200..300).contains(&response.status) {
            return Err(SuggestionError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let decoded: SuggestionResponse = serde_json::from_slice(&response.body)?;
        Ok(decoded.folders)
    }
}

/// Flatten suggestions into one row per podcast
pub fn to_suggested_folders(suggestions: &[FolderSuggestion]) -> Vec<SuggestedFolder> {
    suggestions
        .iter()
        .flat_map(|suggestion| {
            suggestion.podcasts.iter().map(|podcast_id| SuggestedFolder {
                name: suggestion.name.clone(),
                podcast_id: podcast_id.clone(),
            })
        })
        .collect()
}

/// Regroup rows by folder name, in order of first appearance
pub fn group_suggested_folders(rows: &[SuggestedFolder]) -> Vec<FolderSuggestion> {
    let mut groups: Vec<FolderSuggestion> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|group| group.name == row.name) {
            Some(group) => group.podcasts.push(row.podcast_id.clone()),
            None => groups.push(FolderSuggestion {
                name: row.name.clone(),
                podcasts: vec![row.podcast_id.clone()],
            }),
        }
    }
    groups
}
