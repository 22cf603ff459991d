//! Gateway payload fixtures

use serde_json::{json, Value};

pub const SELF_ID: &str = "01FD58YK5W7QRV5H3D64NTQ5HD";
pub const FRIEND_ID: &str = "01FD58YK5W7QRV5H3D64NTQ5HE";
pub const SERVER_ID: &str = "01FD58YK5W7QRV5H3D64NTQ5HF";
pub const CHANNEL_ID: &str = "01FD58YK5W7QRV5H3D64NTQ5HG";

pub const BOT_TOKEN: &str = "integration-bot-token";

pub fn authenticated() -> Value {
    json!({"type": "Authenticated"})
}

pub fn ready() -> Value {
    json!({
        "type": "Ready",
        "users": [
            {"_id": SELF_ID, "username": "mutiny", "online": true, "relationship": "User"},
            {"_id": FRIEND_ID, "username": "friend", "online": true, "relationship": "Friend"}
        ],
        "servers": [{
            "_id": SERVER_ID,
            "owner": SELF_ID,
            "name": "Integration",
            "channels": [CHANNEL_ID],
            "roles": {}
        }],
        "channels": [{
            "_id": CHANNEL_ID,
            "channel_type": "TextChannel",
            "server": SERVER_ID,
            "name": "general"
        }],
        "members": [
            {"_id": {"server": SERVER_ID, "user": SELF_ID}, "roles": []},
            {"_id": {"server": SERVER_ID, "user": FRIEND_ID}, "roles": []}
        ]
    })
}

pub fn message(id: &str, content: &str) -> Value {
    json!({
        "type": "Message",
        "_id": id,
        "channel": CHANNEL_ID,
        "author": FRIEND_ID,
        "content": content
    })
}

pub fn channel_create(id: &str, name: &str) -> Value {
    json!({
        "type": "ChannelCreate",
        "_id": id,
        "channel_type": "TextChannel",
        "server": SERVER_ID,
        "name": name
    })
}

pub fn error(id: &str) -> Value {
    json!({"type": "Error", "error": id})
}

/// API root document pointing the client at `gateway_url`
pub fn api_configuration(gateway_url: &str) -> Value {
    json!({
        "revolt": "0.5.3",
        "features": {
            "captcha": {"enabled": false, "key": ""},
            "email": false,
            "invite_only": false,
            "autumn": {"enabled": true, "url": "http://autumn.invalid"},
            "january": {"enabled": false, "url": ""},
            "voso": {"enabled": false, "url": "", "ws": ""}
        },
        "ws": gateway_url,
        "app": "http://app.invalid",
        "vapid": ""
    })
}
