use crate::model::HttpMethod;

/// A canned endpoint template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub label: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub body: &'static str,
    pub content_type: &'static str,
    pub description: &'static str,
    pub multipart: bool,
}

const JSON: &str = "application/json";

pub const PRESETS: &[Preset] = &[
    Preset {
        label: "List Photos",
        method: HttpMethod::Get,
        path: "/photos",
        body: "",
        content_type: JSON,
        description: "Paginated list of photos in the account",
        multipart: false,
    },
    Preset {
        label: "Get Photo",
        method: HttpMethod::Get,
        path: "/photos/{id}",
        body: "",
        content_type: JSON,
        description: "Fetch a single photo with its metadata",
        multipart: false,
    },
    Preset {
        label: "Upload Photo",
        method: HttpMethod::Post,
        path: "/photos",
        body: "",
        content_type: "multipart/form-data",
        description: "Upload an image file with an optional caption",
        multipart: true,
    },
    Preset {
        label: "Update Photo",
        method: HttpMethod::Patch,
        path: "/photos/{id}",
        body: "{\n  \"caption\": \"Sunset over the bay\",\n  \"tags\": [\"travel\", \"sea\"]\n}",
        content_type: JSON,
        description: "Change caption or tags of a photo",
        multipart: false,
    },
    Preset {
        label: "Delete Photo",
        method: HttpMethod::Delete,
        path: "/photos/{id}",
        body: "",
        content_type: JSON,
        description: "Permanently remove a photo",
        multipart: false,
    },
    Preset {
        label: "Search Places",
        method: HttpMethod::Get,
        path: "/places/search",
        body: "",
        content_type: JSON,
        description: "Search places by name or coordinates",
        multipart: false,
    },
    Preset {
        label: "Create Album",
        method: HttpMethod::Post,
        path: "/albums",
        body: "{\n  \"name\": \"Summer trip\",\n  \"private\": true\n}",
        content_type: JSON,
        description: "Create a new album",
        multipart: false,
    },
    Preset {
        label: "Replace Album",
        method: HttpMethod::Put,
        path: "/albums/{id}",
        body: "{\n  \"name\": \"Summer trip 2024\",\n  \"private\": false\n}",
        content_type: JSON,
        description: "Replace all fields of an album",
        multipart: false,
    },
    Preset {
        label: "Create Webhook",
        method: HttpMethod::Post,
        path: "/webhooks",
        body: "{\n  \"url\": \"https://example.com/hooks/photos\",\n  \"events\": [\"photo.created\"]\n}",
        content_type: JSON,
        description: "Subscribe to account events",
        multipart: false,
    },
    Preset {
        label: "Usage",
        method: HttpMethod::Get,
        path: "/usage",
        body: "",
        content_type: JSON,
        description: "API call counts for the current billing period",
        multipart: false,
    },
];

/// The full ordered catalog.
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Look up a preset by its label (exact match).
pub fn find(label: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.label == label)
}
