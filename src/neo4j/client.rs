//! Neo4j client for interacting with the policy corpus graph
//!
//! Storage layout:
//! - `(:CorpusNode {id, node_type, title, description, status, created_at, updated_at})`
//! - `(:CorpusNode)-[:RELATES {id, edge_type, weight, description, created_at}]->(:CorpusNode)`
//! - `(:EdgeType {key, label, description})`
//! - `(:Tag {id, name, description})`, `(:Tag)-[:CHILD_OF]->(:Tag)`
//! - `(:CorpusNode)-[:TAGGED]->(:Tag)`

use super::models::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use neo4rs::{query, Graph, Query};
use std::sync::Arc;
use uuid::Uuid;

/// Columns returned by every edge query; `a` and `b` are the endpoints.
const EDGE_COLUMNS: &str = "r.id AS id, a.id AS from_id, b.id AS to_id, \
     r.edge_type AS edge_type, r.weight AS weight, \
     r.description AS description, r.created_at AS created_at";

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

fn ids_param(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn parse_timestamp(raw: Option<String>) -> DateTime<Utc> {
    raw.and_then(|s| s.parse().ok()).unwrap_or_else(Utc::now)
}

/// Empty strings are how optional text is stored; read them back as `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints, indexes and default edge types
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT corpus_node_id IF NOT EXISTS FOR (n:CorpusNode) REQUIRE n.id IS UNIQUE",
            "CREATE CONSTRAINT tag_id IF NOT EXISTS FOR (t:Tag) REQUIRE t.id IS UNIQUE",
            "CREATE CONSTRAINT tag_name IF NOT EXISTS FOR (t:Tag) REQUIRE t.name IS UNIQUE",
            "CREATE CONSTRAINT edge_type_key IF NOT EXISTS FOR (t:EdgeType) REQUIRE t.key IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX corpus_node_type IF NOT EXISTS FOR (n:CorpusNode) ON (n.node_type)",
            "CREATE INDEX corpus_node_title IF NOT EXISTS FOR (n:CorpusNode) ON (n.title)",
            "CREATE INDEX relates_id IF NOT EXISTS FOR ()-[r:RELATES]-() ON (r.id)",
            "CREATE INDEX relates_type IF NOT EXISTS FOR ()-[r:RELATES]-() ON (r.edge_type)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        // Seed the registry without overwriting labels edited at runtime
        for def in default_edge_types() {
            let q = query(
                r#"
                MERGE (t:EdgeType {key: $key})
                ON CREATE SET t.label = $label, t.description = ''
                "#,
            )
            .param("key", def.key)
            .param("label", def.label);
            self.graph
                .run(q)
                .await
                .context("Failed to seed edge type registry")?;
        }

        Ok(())
    }

    /// Execute a raw Cypher query (internal use only)
    pub(crate) async fn execute(&self, cypher: &str) -> Result<Vec<neo4rs::Row>> {
        self.execute_with_params(query(cypher)).await
    }

    /// Execute a parameterized Cypher query (internal use only)
    pub(crate) async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    // ========================================================================
    // Corpus node operations
    // ========================================================================

    /// Create a new node
    pub async fn create_node(&self, node: &CorpusNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (n:CorpusNode {
                id: $id,
                node_type: $node_type,
                title: $title,
                description: $description,
                status: $status,
                created_at: $created_at,
                updated_at: $updated_at
            })
            "#,
        )
        .param("id", node.id.to_string())
        .param("node_type", node.node_type.as_str())
        .param("title", node.title.clone())
        .param("description", node.description.clone().unwrap_or_default())
        .param("status", node.status.clone())
        .param("created_at", node.created_at.to_rfc3339())
        .param("updated_at", node.updated_at.to_rfc3339());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Get a node by ID
    pub async fn get_node(&self, id: Uuid) -> Result<Option<CorpusNode>> {
        let q = query(
            r#"
            MATCH (n:CorpusNode {id: $id})
            RETURN n
            "#,
        )
        .param("id", id.to_string());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("n")?;
            Ok(Some(self.node_to_corpus_node(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Get several nodes by ID
    pub async fn get_nodes(&self, ids: &[Uuid]) -> Result<Vec<CorpusNode>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let q = query(
            r#"
            MATCH (n:CorpusNode)
            WHERE n.id IN $ids
            RETURN n
            "#,
        )
        .param("ids", ids_param(ids));

        self.collect_nodes(q).await
    }

    /// List nodes, optionally filtered by type
    pub async fn list_nodes(
        &self,
        node_types: Option<&[CorpusNodeType]>,
    ) -> Result<Vec<CorpusNode>> {
        let q = match node_types {
            Some(types) => query(
                r#"
                MATCH (n:CorpusNode)
                WHERE n.node_type IN $types
                RETURN n
                ORDER BY n.title
                "#,
            )
            .param(
                "types",
                types
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect::<Vec<_>>(),
            ),
            None => query(
                r#"
                MATCH (n:CorpusNode)
                RETURN n
                ORDER BY n.title
                "#,
            ),
        };

        self.collect_nodes(q).await
    }

    /// Update node fields (title, description, status)
    pub async fn update_node(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<Option<String>>,
        status: Option<String>,
    ) -> Result<()> {
        let mut set_clauses = vec!["n.updated_at = $updated_at"];

        if title.is_some() {
            set_clauses.push("n.title = $title");
        }
        if description.is_some() {
            set_clauses.push("n.description = $description");
        }
        if status.is_some() {
            set_clauses.push("n.status = $status");
        }

        let cypher = format!(
            "MATCH (n:CorpusNode {{id: $id}}) SET {}",
            set_clauses.join(", ")
        );

        let mut q = query(&cypher)
            .param("id", id.to_string())
            .param("updated_at", Utc::now().to_rfc3339());

        if let Some(title) = title {
            q = q.param("title", title);
        }
        if let Some(desc) = description {
            q = q.param("description", desc.unwrap_or_default());
        }
        if let Some(status) = status {
            q = q.param("status", status);
        }

        self.graph.run(q).await?;
        Ok(())
    }

    /// Delete a node; DETACH removes its RELATES and TAGGED relationships
    pub async fn delete_node(&self, id: Uuid) -> Result<()> {
        let q = query(
            r#"
            MATCH (n:CorpusNode {id: $id})
            DETACH DELETE n
            "#,
        )
        .param("id", id.to_string());

        self.graph.run(q).await?;
        Ok(())
    }

    async fn collect_nodes(&self, q: Query) -> Result<Vec<CorpusNode>> {
        let mut result = self.graph.execute(q).await?;
        let mut nodes = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("n")?;
            nodes.push(self.node_to_corpus_node(&node)?);
        }
        Ok(nodes)
    }

    /// Helper to convert Neo4j node to CorpusNode
    fn node_to_corpus_node(&self, node: &neo4rs::Node) -> Result<CorpusNode> {
        let node_type: String = node.get("node_type")?;
        Ok(CorpusNode {
            id: node.get::<String>("id")?.parse()?,
            node_type: node_type.parse().map_err(anyhow::Error::msg)?,
            title: node.get("title")?,
            description: non_empty(node.get("description").ok()),
            status: node
                .get("status")
                .unwrap_or_else(|_| DEFAULT_NODE_STATUS.to_string()),
            created_at: parse_timestamp(node.get("created_at").ok()),
            updated_at: parse_timestamp(node.get("updated_at").ok()),
        })
    }

    // ========================================================================
    // Edge operations
    // ========================================================================

    /// Create an edge. MERGE on the `(from, to, edge_type)` triple makes the
    /// uniqueness check atomic; a returned id different from ours means the
    /// edge already existed.
    pub async fn create_edge(&self, edge: &CorpusEdge) -> Result<()> {
        let q = query(
            r#"
            MATCH (a:CorpusNode {id: $from_id}), (b:CorpusNode {id: $to_id})
            MERGE (a)-[r:RELATES {edge_type: $edge_type}]->(b)
            ON CREATE SET
                r.id = $id,
                r.weight = $weight,
                r.description = $description,
                r.created_at = $created_at
            RETURN r.id AS id
            "#,
        )
        .param("id", edge.id.to_string())
        .param("from_id", edge.from_node_id.to_string())
        .param("to_id", edge.to_node_id.to_string())
        .param("edge_type", edge.edge_type.clone())
        .param("weight", edge.weight)
        .param("description", edge.description.clone().unwrap_or_default())
        .param("created_at", edge.created_at.to_rfc3339());

        let rows = self.execute_with_params(q).await?;
        let row = rows
            .first()
            .ok_or(CorpusError::NodeNotFound(edge.from_node_id))?;
        let stored_id: String = row.get("id")?;
        if stored_id != edge.id.to_string() {
            return Err(CorpusError::DuplicateEdge {
                from: edge.from_node_id,
                to: edge.to_node_id,
                edge_type: edge.edge_type.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Get an edge by ID
    pub async fn get_edge(&self, id: Uuid) -> Result<Option<CorpusEdge>> {
        let cypher = format!(
            "MATCH (a:CorpusNode)-[r:RELATES {{id: $id}}]->(b:CorpusNode) RETURN {}",
            EDGE_COLUMNS
        );
        let q = query(&cypher).param("id", id.to_string());

        let rows = self.execute_with_params(q).await?;
        rows.first().map(row_to_edge).transpose()
    }

    /// List edges, optionally filtered by type
    pub async fn list_edges(&self, edge_types: Option<&[String]>) -> Result<Vec<CorpusEdge>> {
        let q = match edge_types {
            Some(types) => {
                let cypher = format!(
                    "MATCH (a:CorpusNode)-[r:RELATES]->(b:CorpusNode) \
                     WHERE r.edge_type IN $types RETURN {}",
                    EDGE_COLUMNS
                );
                query(&cypher).param("types", types.to_vec())
            }
            None => {
                let cypher = format!(
                    "MATCH (a:CorpusNode)-[r:RELATES]->(b:CorpusNode) RETURN {}",
                    EDGE_COLUMNS
                );
                query(&cypher)
            }
        };

        self.collect_edges(q).await
    }

    /// Update edge weight / description
    pub async fn update_edge(
        &self,
        id: Uuid,
        weight: Option<f64>,
        description: Option<Option<String>>,
    ) -> Result<()> {
        let mut set_clauses = vec![];

        if weight.is_some() {
            set_clauses.push("r.weight = $weight");
        }
        if description.is_some() {
            set_clauses.push("r.description = $description");
        }

        if set_clauses.is_empty() {
            return Ok(());
        }

        let cypher = format!(
            "MATCH ()-[r:RELATES {{id: $id}}]->() SET {}",
            set_clauses.join(", ")
        );

        let mut q = query(&cypher).param("id", id.to_string());
        if let Some(weight) = weight {
            q = q.param("weight", weight);
        }
        if let Some(desc) = description {
            q = q.param("description", desc.unwrap_or_default());
        }

        self.graph.run(q).await?;
        Ok(())
    }

    /// Delete an edge
    pub async fn delete_edge(&self, id: Uuid) -> Result<()> {
        let q = query(
            r#"
            MATCH ()-[r:RELATES {id: $id}]->()
            DELETE r
            "#,
        )
        .param("id", id.to_string());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Edges touching any node of the frontier, either direction
    pub async fn get_incident_edges(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>> {
        if node_ids.is_empty() {
            return Ok(vec![]);
        }
        let cypher = format!(
            r#"
            UNWIND $ids AS nid
            MATCH (:CorpusNode {{id: nid}})-[r:RELATES]-()
            WITH DISTINCT r
            MATCH (a:CorpusNode)-[r]->(b:CorpusNode)
            RETURN {}
            "#,
            EDGE_COLUMNS
        );
        let q = query(&cypher).param("ids", ids_param(node_ids));

        self.collect_edges(q).await
    }

    /// Edges whose both endpoints are in the given set
    pub async fn get_edges_among(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>> {
        if node_ids.is_empty() {
            return Ok(vec![]);
        }
        let cypher = format!(
            "MATCH (a:CorpusNode)-[r:RELATES]->(b:CorpusNode) \
             WHERE a.id IN $ids AND b.id IN $ids RETURN {}",
            EDGE_COLUMNS
        );
        let q = query(&cypher).param("ids", ids_param(node_ids));

        self.collect_edges(q).await
    }

    async fn collect_edges(&self, q: Query) -> Result<Vec<CorpusEdge>> {
        let rows = self.execute_with_params(q).await?;
        rows.iter().map(row_to_edge).collect()
    }

    // ========================================================================
    // Edge type registry
    // ========================================================================

    /// List registered edge types
    pub async fn list_edge_types(&self) -> Result<Vec<EdgeTypeDefinition>> {
        let q = query(
            r#"
            MATCH (t:EdgeType)
            RETURN t
            ORDER BY t.key
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| {
                let node: neo4rs::Node = row.get("t")?;
                node_to_edge_type(&node)
            })
            .collect()
    }

    /// Get an edge type by key
    pub async fn get_edge_type(&self, key: &str) -> Result<Option<EdgeTypeDefinition>> {
        let q = query(
            r#"
            MATCH (t:EdgeType {key: $key})
            RETURN t
            "#,
        )
        .param("key", key);

        let rows = self.execute_with_params(q).await?;
        match rows.first() {
            Some(row) => {
                let node: neo4rs::Node = row.get("t")?;
                Ok(Some(node_to_edge_type(&node)?))
            }
            None => Ok(None),
        }
    }

    /// Register or relabel an edge type
    pub async fn upsert_edge_type(&self, def: &EdgeTypeDefinition) -> Result<()> {
        let q = query(
            r#"
            MERGE (t:EdgeType {key: $key})
            SET t.label = $label, t.description = $description
            "#,
        )
        .param("key", def.key.clone())
        .param("label", def.label.clone())
        .param("description", def.description.clone().unwrap_or_default());

        self.graph.run(q).await?;
        Ok(())
    }

    // ========================================================================
    // Tag operations
    // ========================================================================

    /// Create a tag (MERGE on name so concurrent creations cannot both win)
    pub async fn create_tag(&self, tag: &Tag) -> Result<()> {
        let q = query(
            r#"
            MERGE (t:Tag {name: $name})
            ON CREATE SET t.id = $id, t.description = $description
            RETURN t.id AS id
            "#,
        )
        .param("id", tag.id.to_string())
        .param("name", tag.name.clone())
        .param("description", tag.description.clone().unwrap_or_default());

        let rows = self.execute_with_params(q).await?;
        let stored_id: String = rows
            .first()
            .context("Tag MERGE returned no row")?
            .get("id")?;
        if stored_id != tag.id.to_string() {
            return Err(CorpusError::DuplicateTag(tag.name.clone()).into());
        }

        if let Some(parent_id) = tag.parent_id {
            self.set_tag_parent(tag.id, Some(parent_id)).await?;
        }
        Ok(())
    }

    /// Get a tag by ID
    pub async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>> {
        let q = query(
            r#"
            MATCH (t:Tag {id: $id})
            OPTIONAL MATCH (t)-[:CHILD_OF]->(p:Tag)
            RETURN t, p.id AS parent_id
            "#,
        )
        .param("id", id.to_string());

        let rows = self.execute_with_params(q).await?;
        rows.first().map(row_to_tag).transpose()
    }

    /// List all tags
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let q = query(
            r#"
            MATCH (t:Tag)
            OPTIONAL MATCH (t)-[:CHILD_OF]->(p:Tag)
            RETURN t, p.id AS parent_id
            ORDER BY t.name
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        rows.iter().map(row_to_tag).collect()
    }

    /// Update tag name, parent and description
    pub async fn update_tag(
        &self,
        id: Uuid,
        name: Option<String>,
        parent_id: Option<Option<Uuid>>,
        description: Option<Option<String>>,
    ) -> Result<()> {
        if let Some(ref name) = name {
            let q = query(
                r#"
                MATCH (o:Tag {name: $name})
                WHERE o.id <> $id
                RETURN o.id AS id
                "#,
            )
            .param("name", name.clone())
            .param("id", id.to_string());
            if !self.execute_with_params(q).await?.is_empty() {
                return Err(CorpusError::DuplicateTag(name.clone()).into());
            }
        }

        let mut set_clauses = vec![];
        if name.is_some() {
            set_clauses.push("t.name = $name");
        }
        if description.is_some() {
            set_clauses.push("t.description = $description");
        }

        if !set_clauses.is_empty() {
            let cypher = format!(
                "MATCH (t:Tag {{id: $id}}) SET {}",
                set_clauses.join(", ")
            );
            let mut q = query(&cypher).param("id", id.to_string());
            if let Some(name) = name {
                q = q.param("name", name);
            }
            if let Some(desc) = description {
                q = q.param("description", desc.unwrap_or_default());
            }
            self.graph.run(q).await?;
        }

        if let Some(parent_id) = parent_id {
            self.set_tag_parent(id, parent_id).await?;
        }
        Ok(())
    }

    /// Replace the CHILD_OF relationship of a tag
    async fn set_tag_parent(&self, id: Uuid, parent_id: Option<Uuid>) -> Result<()> {
        let q = query(
            r#"
            MATCH (t:Tag {id: $id})-[c:CHILD_OF]->()
            DELETE c
            "#,
        )
        .param("id", id.to_string());
        self.graph.run(q).await?;

        if let Some(parent_id) = parent_id {
            let q = query(
                r#"
                MATCH (t:Tag {id: $id}), (p:Tag {id: $parent_id})
                MERGE (t)-[:CHILD_OF]->(p)
                "#,
            )
            .param("id", id.to_string())
            .param("parent_id", parent_id.to_string());
            self.graph.run(q).await?;
        }
        Ok(())
    }

    /// Delete a tag; DETACH drops TAGGED links and children's CHILD_OF
    pub async fn delete_tag(&self, id: Uuid) -> Result<()> {
        let q = query(
            r#"
            MATCH (t:Tag {id: $id})
            DETACH DELETE t
            "#,
        )
        .param("id", id.to_string());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Attach a tag to a node
    pub async fn add_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        let q = query(
            r#"
            MATCH (n:CorpusNode {id: $node_id}), (t:Tag {id: $tag_id})
            MERGE (n)-[:TAGGED]->(t)
            "#,
        )
        .param("node_id", node_id.to_string())
        .param("tag_id", tag_id.to_string());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Detach a tag from a node
    pub async fn remove_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        let q = query(
            r#"
            MATCH (n:CorpusNode {id: $node_id})-[r:TAGGED]->(t:Tag {id: $tag_id})
            DELETE r
            "#,
        )
        .param("node_id", node_id.to_string())
        .param("tag_id", tag_id.to_string());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Tags directly attached to a node
    pub async fn get_node_tags(&self, node_id: Uuid) -> Result<Vec<Tag>> {
        let q = query(
            r#"
            MATCH (n:CorpusNode {id: $id})-[:TAGGED]->(t:Tag)
            OPTIONAL MATCH (t)-[:CHILD_OF]->(p:Tag)
            RETURN t, p.id AS parent_id
            ORDER BY t.name
            "#,
        )
        .param("id", node_id.to_string());

        let rows = self.execute_with_params(q).await?;
        rows.iter().map(row_to_tag).collect()
    }

    /// Nodes carrying any of the given tags, as `(node_id, tag_id)` pairs
    pub async fn get_nodes_with_any_tag(&self, tag_ids: &[Uuid]) -> Result<Vec<(Uuid, Uuid)>> {
        if tag_ids.is_empty() {
            return Ok(vec![]);
        }
        let q = query(
            r#"
            MATCH (n:CorpusNode)-[:TAGGED]->(t:Tag)
            WHERE t.id IN $ids
            RETURN n.id AS node_id, t.id AS tag_id
            "#,
        )
        .param("ids", ids_param(tag_ids));

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| {
                let node_id: String = row.get("node_id")?;
                let tag_id: String = row.get("tag_id")?;
                Ok((node_id.parse()?, tag_id.parse()?))
            })
            .collect()
    }
}

fn row_to_edge(row: &neo4rs::Row) -> Result<CorpusEdge> {
    Ok(CorpusEdge {
        id: row.get::<String>("id")?.parse()?,
        from_node_id: row.get::<String>("from_id")?.parse()?,
        to_node_id: row.get::<String>("to_id")?.parse()?,
        edge_type: row.get("edge_type")?,
        weight: row.get::<f64>("weight").unwrap_or(DEFAULT_EDGE_WEIGHT),
        description: non_empty(row.get("description").ok()),
        created_at: parse_timestamp(row.get("created_at").ok()),
    })
}

fn row_to_tag(row: &neo4rs::Row) -> Result<Tag> {
    let node: neo4rs::Node = row.get("t")?;
    let parent_id = match row.get::<String>("parent_id") {
        Ok(raw) => Some(raw.parse()?),
        Err(_) => None,
    };
    Ok(Tag {
        id: node.get::<String>("id")?.parse()?,
        name: node.get("name")?,
        parent_id,
        description: non_empty(node.get("description").ok()),
    })
}

fn node_to_edge_type(node: &neo4rs::Node) -> Result<EdgeTypeDefinition> {
    Ok(EdgeTypeDefinition {
        key: node.get("key")?,
        label: node.get("label")?,
        description: non_empty(node.get("description").ok()),
    })
}
