//! Handlers for the graph commands.
//!
//! Each handler returns the text to print so the dispatcher owns stdout and
//! tests can assert on output against an in-memory store.

use crate::cli::TraversalArgs;
use kgpath_core::{Error, ExtractionSettings, Result};
use kgpath_graph::query::{
    ConnectionInfo, ConnectionsResponse, EntityInfo, EntityListResponse, InspectResponse,
    PathsResponse,
};
use kgpath_graph::{
    Direction, ExportOptions, ExtractionRequest, Extractor, GraphStore, LabelFilter,
    build_samples, compute_stats, validate_subgraph, write_samples,
};
use std::path::Path;

// ============================================================================
// Request building
// ============================================================================

/// Merge command-line overrides into the configured extraction defaults.
pub fn build_request(
    entity: &str,
    traversal: &TraversalArgs,
    min_hops: Option<usize>,
    max_depth: Option<usize>,
    defaults: &ExtractionSettings,
) -> ExtractionRequest {
    let mut request = ExtractionRequest::from_settings(entity, defaults);
    if let Some(hops) = traversal.hops {
        request = request.with_max_hops(hops);
    }
    if let Some(direction) = &traversal.direction {
        request = request.with_direction(Direction::parse_lenient(direction));
    }
    if !traversal.labels.is_empty() {
        request.labels = LabelFilter::from_labels(&traversal.labels);
    }
    if let Some(min) = min_hops {
        request = request.with_min_hops(min);
    }
    if max_depth.is_some() {
        request = request.with_max_depth(max_depth);
    }
    request
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// ============================================================================
// Handlers
// ============================================================================

/// `kgpath paths`: one rendered path per line, or a JSON response.
pub async fn handle_paths(
    extractor: &Extractor,
    request: &ExtractionRequest,
    json: bool,
) -> Result<String> {
    let extraction = extractor.extract(request).await?;
    if json {
        return to_json(&PathsResponse::new(request, &extraction));
    }
    if extraction.paths.is_empty() {
        log::info!("no paths found for '{}'", request.start_name);
    }
    let truncated = extraction.truncated_count();
    if truncated > 0 {
        log::warn!(
            "{truncated} of {} paths for '{}' were cut short by the cycle or depth guard",
            extraction.paths.len(),
            request.start_name
        );
    }
    Ok(extraction.rendered().join("\n"))
}

/// `kgpath inspect`: statistics and validation of the assembled subgraph.
pub async fn handle_inspect(
    extractor: &Extractor,
    request: &ExtractionRequest,
    json: bool,
) -> Result<String> {
    let (subgraph, report) = extractor.fetch_subgraph(request).await?;
    let response = InspectResponse {
        entity: request.start_name.clone(),
        stats: compute_stats(&subgraph),
        validation: validate_subgraph(&subgraph),
        dropped_nodes: report.dropped_nodes,
        dropped_edges: report.dropped_edges,
        repaired_nodes: report.repaired_nodes,
    };
    if json {
        return to_json(&response);
    }

    let stats = &response.stats;
    let mut lines = vec![
        format!("Subgraph for '{}'", response.entity),
        format!("  Nodes: {}", stats.node_count),
        format!("  Edges: {} ({} skipped)", stats.edge_count, stats.skipped_edges),
        format!(
            "  Roots: {}  Leaves: {}  Isolated: {}",
            stats.root_count, stats.leaf_count, stats.isolated_count
        ),
        format!(
            "  Assembly: {} nodes dropped, {} edges dropped, {} nodes repaired",
            response.dropped_nodes, response.dropped_edges, response.repaired_nodes
        ),
    ];
    if let Some(name) = &stats.most_referenced {
        lines.push(format!("  Max in-degree: {} ({name})", stats.max_in_degree));
    }
    if let Some(name) = &stats.most_referencing {
        lines.push(format!("  Max out-degree: {} ({name})", stats.max_out_degree));
    }
    if !stats.label_distribution.is_empty() {
        lines.push("  Labels:".to_string());
        for (label, count) in &stats.label_distribution {
            lines.push(format!("    {label}: {count}"));
        }
    }
    if !stats.relation_distribution.is_empty() {
        lines.push("  Relations:".to_string());
        for (relation, count) in &stats.relation_distribution {
            lines.push(format!("    {relation}: {count}"));
        }
    }

    let validation = &response.validation;
    lines.push(format!(
        "Validation: {}",
        if validation.valid { "valid" } else { "INVALID" }
    ));
    for issue in &validation.errors {
        lines.push(format!("  error [{}]: {}", issue.code, issue.message));
    }
    for issue in &validation.warnings {
        lines.push(format!("  warning [{}]: {}", issue.code, issue.message));
    }
    Ok(lines.join("\n"))
}

/// `kgpath entities`.
pub async fn handle_entities(
    store: &dyn GraphStore,
    label: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<String> {
    let nodes = store.list_entities(label, limit.max(1)).await?;
    if json {
        return to_json(&EntityListResponse::new(label, &nodes));
    }
    Ok(nodes
        .iter()
        .map(|n| {
            let labels: Vec<&str> = n.labels.iter().map(String::as_str).collect();
            format!("{}\t{}\t[{}]", n.key, n.name, labels.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `kgpath entity`: the full record as JSON.
pub async fn handle_entity(store: &dyn GraphStore, name: &str) -> Result<String> {
    let node = store
        .get_entity(name)
        .await?
        .ok_or_else(|| Error::not_found(format!("entity '{name}'")))?;
    to_json(&EntityInfo::from(&node))
}

/// `kgpath connections`.
pub async fn handle_connections(
    store: &dyn GraphStore,
    key: &str,
    direction: Direction,
    limit: usize,
    json: bool,
) -> Result<String> {
    let connections = store.entity_connections(key, direction, limit.max(1)).await?;
    if json {
        let infos: Vec<ConnectionInfo> = connections.iter().map(ConnectionInfo::from).collect();
        return to_json(&ConnectionsResponse {
            key: key.to_string(),
            direction: direction.to_string(),
            count: infos.len(),
            connections: infos,
        });
    }
    Ok(connections
        .iter()
        .map(|c| {
            let arrow = if c.edge.start == key {
                format!("-[{}]->", c.edge.relation_type)
            } else {
                format!("<-[{}]-", c.edge.relation_type)
            };
            format!("{arrow} {} ({})", c.node.name, c.node.key)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `kgpath export`.
pub async fn handle_export(
    extractor: &Extractor,
    options: &ExportOptions,
    out: &Path,
) -> Result<String> {
    let samples = build_samples(extractor, options).await?;
    write_samples(out, &samples)?;
    Ok(format!(
        "Exported {} samples to {}",
        samples.len(),
        out.display()
    ))
}

/// `kgpath health`.
pub async fn handle_health(store: &dyn GraphStore) -> Result<String> {
    store.ping().await?;
    Ok(format!("{}: healthy", store.name()))
}

// ============================================================================
// Tests
// ============================================================================
