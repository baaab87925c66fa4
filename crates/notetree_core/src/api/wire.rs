//! Request and response envelopes of the remote API.

use crate::model::folder::{Folder, FolderId};
use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `noFolderNotes` is also sent but ignored; unfiled notes are derived.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FoldersEnvelope {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotesEnvelope {
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateFolderRequest<'a> {
    pub name: &'a str,
    pub parent_folder_id: Option<FolderId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateNoteRequest<'a> {
    pub heading: &'a str,
    pub body: Value,
    pub folder_id: Option<FolderId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FolderParentRequest {
    pub parent_folder_id: Option<FolderId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NoteFolderRequest {
    pub folder_id: Option<FolderId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrivacyResponse {
    #[serde(rename = "private")]
    pub is_private: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub bio: &'a str,
    pub full_name: &'a str,
    pub profile_picture_data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DocumentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub heading: &'a str,
    pub body: &'a Value,
}
