//! MessagePack and JSON encodings for everything that crosses the core boundary.
//!
//! MessagePack payloads are written with named struct fields so that tagged
//! enums and defaulted fields decode the same way they do from JSON.

use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::{Action, GameStatus, LobbyStatus, StatusReply};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_status(status: &GameStatus) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(status)?)
}

pub fn deserialize_status(bytes: &[u8]) -> Result<GameStatus, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_status_reply(reply: &StatusReply) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(reply)?)
}

pub fn deserialize_status_reply(bytes: &[u8]) -> Result<StatusReply, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_actions(actions: &[Action]) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(actions)?)
}

pub fn deserialize_actions(bytes: &[u8]) -> Result<Vec<Action>, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_lobby_status(status: &LobbyStatus) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(status)?)
}

pub fn deserialize_lobby_status(bytes: &[u8]) -> Result<LobbyStatus, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_status_json(status: &GameStatus) -> Result<String, WireError> {
    Ok(serde_json::to_string(status)?)
}

pub fn deserialize_status_json(json: &str) -> Result<GameStatus, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_status_reply_json(reply: &StatusReply) -> Result<String, WireError> {
    Ok(serde_json::to_string(reply)?)
}

pub fn deserialize_status_reply_json(json: &str) -> Result<StatusReply, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_lobby_status_json(status: &LobbyStatus) -> Result<String, WireError> {
    Ok(serde_json::to_string(status)?)
}

pub fn deserialize_lobby_status_json(json: &str) -> Result<LobbyStatus, WireError> {
    Ok(serde_json::from_str(json)?)
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
pub fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
