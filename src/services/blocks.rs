//! Block library service — definitions, templates, and configuration merge.
//!
//! DESIGN
//! ======
//! A block definition is the canonical shape of a content unit (`block_type`
//! is its immutable key). Templates place definitions into zones with partial
//! overrides; newsletter issues add a final layer of values. The effective
//! configuration of a block is the shallow field-wise merge
//! definition → template → issue, with later layers winning per top-level
//! field. Disabling a block at the template level removes it from resolution
//! regardless of issue-level values.

use std::collections::HashMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BlocksError {
    #[error("block definition not found: {0}")]
    DefinitionNotFound(Uuid),
    #[error("block type already defined: {0}")]
    BlockTypeTaken(String),
    #[error("block definition in use by templates: {0}")]
    DefinitionInUse(String),
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("invalid zone: {0}")]
    InvalidZone(String),
    #[error("template not found: {0}")]
    TemplateNotFound(Uuid),
    #[error("template in use by newsletters: {0}")]
    TemplateInUse(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Top-level settings object of a block layer.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Newsletter zone a block can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Header,
    Body,
    Footer,
}

impl Zone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Footer => "footer",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            "footer" => Some(Self::Footer),
            _ => None,
        }
    }

    /// Render order: header, body, footer.
    #[must_use]
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Header => 0,
            Self::Body => 1,
            Self::Footer => 2,
        }
    }
}

/// Row returned from definition queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DefinitionRow {
    pub id: Uuid,
    pub block_type: String,
    pub name: String,
    pub default_schema: serde_json::Value,
    pub default_settings: serde_json::Value,
    pub created_at: Option<String>,
}

/// One block placement inside a template zone.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TemplateBlock {
    pub zone: Zone,
    pub block_type: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "empty_object")]
    pub overrides: serde_json::Value,
}

fn default_enabled() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Settings::new())
}

/// Row returned from template queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: Option<String>,
}

/// A template together with its zone placements.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: TemplateRow,
    pub blocks: Vec<TemplateBlock>,
}

// =============================================================================
// CONFIGURATION MERGE
// =============================================================================

/// Shallow-merge override layers onto defaults. Later layers win per
/// top-level field; nested objects are replaced wholesale, not recursed into.
#[must_use]
pub fn merge_block_settings(defaults: &Settings, layers: &[&Settings]) -> Settings {
    let mut merged = defaults.clone();
    for layer in layers {
        for (key, value) in *layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// A block with its effective configuration, ready to render.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedBlock {
    pub zone: Zone,
    pub block_type: String,
    pub position: i32,
    pub settings: Settings,
}

/// Resolve the effective configuration of every enabled template block.
///
/// `definitions` maps block type → default settings; `issue_values` maps
/// (zone, block type) → issue-level values. Output is ordered header →
/// body → footer, then by template position.
#[must_use]
pub fn resolve_blocks(
    definitions: &HashMap<String, Settings>,
    template_blocks: &[TemplateBlock],
    issue_values: &HashMap<(Zone, String), Settings>,
) -> Vec<ResolvedBlock> {
    let empty = Settings::new();
    let mut placed: Vec<&TemplateBlock> = template_blocks.iter().collect();
    placed.sort_by_key(|block| (block.zone.rank(), block.position));

    placed
        .into_iter()
        .filter(|block| block.enabled)
        .map(|block| {
            let defaults = definitions.get(&block.block_type).unwrap_or(&empty);
            let mut layers: Vec<&Settings> = Vec::new();
            if let Some(overrides) = block.overrides.as_object() {
                layers.push(overrides);
            }
            if let Some(values) = issue_values.get(&(block.zone, block.block_type.clone())) {
                layers.push(values);
            }
            ResolvedBlock {
                zone: block.zone,
                block_type: block.block_type.clone(),
                position: block.position,
                settings: merge_block_settings(defaults, &layers),
            }
        })
        .collect()
}

// =============================================================================
// DEFINITION CRUD
// =============================================================================

const DEFINITION_COLUMNS: &str = "id, block_type, name, default_schema, default_settings, \
     to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

fn definition_from_row(row: &sqlx::postgres::PgRow) -> DefinitionRow {
    DefinitionRow {
        id: row.get("id"),
        block_type: row.get("block_type"),
        name: row.get("name"),
        default_schema: row.get("default_schema"),
        default_settings: row.get("default_settings"),
        created_at: row.get("created_at"),
    }
}

/// Create a block definition. `block_type` is its immutable key.
///
/// # Errors
///
/// Returns [`BlocksError::BlockTypeTaken`] when the key already exists.
pub async fn create_definition(
    pool: &PgPool,
    block_type: &str,
    name: &str,
    default_schema: serde_json::Value,
    default_settings: serde_json::Value,
) -> Result<DefinitionRow, BlocksError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM block_definitions WHERE block_type = $1)")
        .bind(block_type)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(BlocksError::BlockTypeTaken(block_type.to_owned()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO block_definitions (id, block_type, name, default_schema, default_settings) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(block_type)
    .bind(name)
    .bind(&default_schema)
    .bind(&default_settings)
    .execute(pool)
    .await?;

    get_definition(pool, id).await
}

/// List all definitions ordered by block type.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_definitions(pool: &PgPool) -> Result<Vec<DefinitionRow>, BlocksError> {
    let rows = sqlx::query(&format!("SELECT {DEFINITION_COLUMNS} FROM block_definitions ORDER BY block_type"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(definition_from_row).collect())
}

/// Fetch one definition.
///
/// # Errors
///
/// Returns [`BlocksError::DefinitionNotFound`] for an unknown id.
pub async fn get_definition(pool: &PgPool, id: Uuid) -> Result<DefinitionRow, BlocksError> {
    let row = sqlx::query(&format!("SELECT {DEFINITION_COLUMNS} FROM block_definitions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(BlocksError::DefinitionNotFound(id))?;
    Ok(definition_from_row(&row))
}

/// Update a definition's name, schema, or default settings. The
/// `block_type` key never changes.
///
/// # Errors
///
/// Returns [`BlocksError::DefinitionNotFound`] for an unknown id.
pub async fn update_definition(
    pool: &PgPool,
    id: Uuid,
    name: Option<String>,
    default_schema: Option<serde_json::Value>,
    default_settings: Option<serde_json::Value>,
) -> Result<DefinitionRow, BlocksError> {
    let current = get_definition(pool, id).await?;
    let name = name.unwrap_or(current.name);
    let default_schema = default_schema.unwrap_or(current.default_schema);
    let default_settings = default_settings.unwrap_or(current.default_settings);

    sqlx::query(
        "UPDATE block_definitions \
         SET name = $2, default_schema = $3, default_settings = $4, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&name)
    .bind(&default_schema)
    .bind(&default_settings)
    .execute(pool)
    .await?;

    get_definition(pool, id).await
}

/// Delete a definition that no template references.
///
/// # Errors
///
/// Returns [`BlocksError::DefinitionInUse`] while any template places it.
pub async fn delete_definition(pool: &PgPool, id: Uuid) -> Result<(), BlocksError> {
    let definition = get_definition(pool, id).await?;

    let in_use: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM template_blocks WHERE block_type = $1)")
        .bind(&definition.block_type)
        .fetch_one(pool)
        .await?;
    if in_use {
        return Err(BlocksError::DefinitionInUse(definition.block_type));
    }

    sqlx::query("DELETE FROM block_definitions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// TEMPLATE CRUD
// =============================================================================

/// Validate that every placement names a known block type.
async fn ensure_known_block_types(pool: &PgPool, blocks: &[TemplateBlock]) -> Result<(), BlocksError> {
    let known: Vec<String> = sqlx::query_scalar("SELECT block_type FROM block_definitions")
        .fetch_all(pool)
        .await?;
    for block in blocks {
        if !known.iter().any(|k| k == &block.block_type) {
            return Err(BlocksError::UnknownBlockType(block.block_type.clone()));
        }
    }
    Ok(())
}

async fn insert_template_blocks(pool: &PgPool, template_id: Uuid, blocks: &[TemplateBlock]) -> Result<(), BlocksError> {
    for block in blocks {
        sqlx::query(
            "INSERT INTO template_blocks (id, template_id, zone, block_type, position, enabled, overrides) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(template_id)
        .bind(block.zone.as_str())
        .bind(&block.block_type)
        .bind(block.position)
        .bind(block.enabled)
        .bind(&block.overrides)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Create a template with its zone placements.
///
/// # Errors
///
/// Returns [`BlocksError::UnknownBlockType`] when a placement names a block
/// type with no definition.
pub async fn create_template(
    pool: &PgPool,
    name: &str,
    description: &str,
    blocks: Vec<TemplateBlock>,
) -> Result<TemplateDetail, BlocksError> {
    ensure_known_block_types(pool, &blocks).await?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO newsletter_templates (id, name, description) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    insert_template_blocks(pool, id, &blocks).await?;

    get_template(pool, id).await
}

/// List all templates, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_templates(pool: &PgPool) -> Result<Vec<TemplateRow>, BlocksError> {
    let rows = sqlx::query(
        "SELECT id, name, description, to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at \
         FROM newsletter_templates ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .iter()
        .map(|row| TemplateRow {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Fetch one template with its placements, zone-ordered.
///
/// # Errors
///
/// Returns [`BlocksError::TemplateNotFound`] for an unknown id.
pub async fn get_template(pool: &PgPool, id: Uuid) -> Result<TemplateDetail, BlocksError> {
    let row = sqlx::query(
        "SELECT id, name, description, to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at \
         FROM newsletter_templates WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(BlocksError::TemplateNotFound(id))?;

    let template = TemplateRow {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    };

    let blocks = load_template_blocks(pool, id).await?;
    Ok(TemplateDetail { template, blocks })
}

/// Load a template's placements, zone-ordered. Rows with an unknown zone
/// value are skipped rather than failing the whole template.
pub(crate) async fn load_template_blocks(pool: &PgPool, template_id: Uuid) -> Result<Vec<TemplateBlock>, BlocksError> {
    let rows = sqlx::query(
        "SELECT zone, block_type, position, enabled, overrides \
         FROM template_blocks WHERE template_id = $1 ORDER BY position",
    )
    .bind(template_id)
    .fetch_all(pool)
    .await?;

    let mut blocks: Vec<TemplateBlock> = rows
        .iter()
        .filter_map(|row| {
            let zone: String = row.get("zone");
            Some(TemplateBlock {
                zone: Zone::from_str(&zone)?,
                block_type: row.get("block_type"),
                position: row.get("position"),
                enabled: row.get("enabled"),
                overrides: row.get("overrides"),
            })
        })
        .collect();
    blocks.sort_by_key(|block| (block.zone.rank(), block.position));
    Ok(blocks)
}

/// Update a template; `blocks`, when given, replaces all placements.
///
/// # Errors
///
/// Returns [`BlocksError::TemplateNotFound`] for an unknown id and
/// [`BlocksError::UnknownBlockType`] for placements without a definition.
pub async fn update_template(
    pool: &PgPool,
    id: Uuid,
    name: Option<String>,
    description: Option<String>,
    blocks: Option<Vec<TemplateBlock>>,
) -> Result<TemplateDetail, BlocksError> {
    let current = get_template(pool, id).await?;
    let name = name.unwrap_or(current.template.name);
    let description = description.unwrap_or(current.template.description);

    sqlx::query("UPDATE newsletter_templates SET name = $2, description = $3, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(&name)
        .bind(&description)
        .execute(pool)
        .await?;

    if let Some(blocks) = blocks {
        ensure_known_block_types(pool, &blocks).await?;
        sqlx::query("DELETE FROM template_blocks WHERE template_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        insert_template_blocks(pool, id, &blocks).await?;
    }

    get_template(pool, id).await
}

/// Delete a template that no newsletter references.
///
/// # Errors
///
/// Returns [`BlocksError::TemplateInUse`] while any newsletter uses it.
pub async fn delete_template(pool: &PgPool, id: Uuid) -> Result<(), BlocksError> {
    let in_use: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM newsletters WHERE template_id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if in_use {
        return Err(BlocksError::TemplateInUse(id));
    }

    let result = sqlx::query("DELETE FROM newsletter_templates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BlocksError::TemplateNotFound(id));
    }
    Ok(())
}

/// Load default settings for a set of block types, keyed by type.
pub(crate) async fn load_default_settings(
    pool: &PgPool,
    block_types: &[String],
) -> Result<HashMap<String, Settings>, BlocksError> {
    if block_types.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query("SELECT block_type, default_settings FROM block_definitions WHERE block_type = ANY($1)")
        .bind(block_types)
        .fetch_all(pool)
        .await?;

    let mut out = HashMap::new();
    for row in &rows {
        let block_type: String = row.get("block_type");
        let settings: serde_json::Value = row.get("default_settings");
        out.insert(block_type, settings.as_object().cloned().unwrap_or_default());
    }
    Ok(out)
}

#[cfg(test)]
#[path = "blocks_test.rs"]
mod tests;
