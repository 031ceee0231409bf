use serde::{Deserialize, Deserializer, Serialize};

/// Administrative division of Bangladesh, or `Unknown` when a place could
/// not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Division {
    Dhaka,
    Chittagong,
    Khulna,
    Sylhet,
    Barisal,
    Rajshahi,
    Rangpur,
    Mymensingh,
    #[default]
    Unknown,
}

impl Division {
    pub const ALL: [Division; 8] = [
        Division::Dhaka,
        Division::Chittagong,
        Division::Khulna,
        Division::Sylhet,
        Division::Barisal,
        Division::Rajshahi,
        Division::Rangpur,
        Division::Mymensingh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dhaka => "Dhaka",
            Self::Chittagong => "Chittagong",
            Self::Khulna => "Khulna",
            Self::Sylhet => "Sylhet",
            Self::Barisal => "Barisal",
            Self::Rajshahi => "Rajshahi",
            Self::Rangpur => "Rangpur",
            Self::Mymensingh => "Mymensingh",
            Self::Unknown => "Unknown",
        }
    }

    /// Case-insensitive lookup that also accepts the newer official spellings.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dhaka" => Self::Dhaka,
            "chittagong" | "chattogram" => Self::Chittagong,
            "khulna" => Self::Khulna,
            "sylhet" => Self::Sylhet,
            "barisal" | "barishal" => Self::Barisal,
            "rajshahi" => Self::Rajshahi,
            "rangpur" => Self::Rangpur,
            "mymensingh" => Self::Mymensingh,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl From<Option<String>> for Division {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl From<Division> for String {
    fn from(value: Division) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category label. Labels outside the vocabulary collapse to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Beach,
    Hill,
    Lake,
    Forest,
    Historical,
    Religious,
    Park,
    Waterfall,
    Island,
    TeaGarden,
    Museum,
    River,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beach => "Beach",
            Self::Hill => "Hill",
            Self::Lake => "Lake",
            Self::Forest => "Forest",
            Self::Historical => "Historical",
            Self::Religious => "Religious",
            Self::Park => "Park",
            Self::Waterfall => "Waterfall",
            Self::Island => "Island",
            Self::TeaGarden => "Tea Garden",
            Self::Museum => "Museum",
            Self::River => "River",
            Self::General => "General",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "beach" => Self::Beach,
            "hill" => Self::Hill,
            "lake" => Self::Lake,
            "forest" => Self::Forest,
            "historical" => Self::Historical,
            "religious" => Self::Religious,
            "park" => Self::Park,
            "waterfall" => Self::Waterfall,
            "island" => Self::Island,
            "tea garden" => Self::TeaGarden,
            "museum" => Self::Museum,
            "river" => Self::River,
            _ => Self::General,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tourist place as stored in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    #[serde(default)]
    pub division: Division,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<Category>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Category>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlaceRecord {
    pub fn new(name: impl Into<String>, division: Division) -> Self {
        Self {
            name: name.into(),
            division,
            description: None,
            url: None,
            image: None,
            categories: vec![Category::General],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn has_description(&self) -> bool {
        !self.description_text().is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }

    /// Text embedded into the vector index: `"{name}: {description}"`.
    ///
    /// Places without a description are not indexed.
    pub fn embedding_text(&self) -> Option<String> {
        if self.has_description() {
            Some(format!("{}: {}", self.name, self.description_text()))
        } else {
            None
        }
    }
}
