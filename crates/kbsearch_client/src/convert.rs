use chrono::{DateTime, NaiveDateTime, Utc};
use kbsearch_core::{
    ClassificationTags, Facets, HistoryEntry, PreviewFailure, ResultItem, SearchFailure,
    SearchFailureKind, SearchReply, SourceDetails,
};

use crate::types::{SearchResponse, WireFacets, WireHistoryItem, WireResult};
use crate::{FailureKind, GatewayError};

pub(crate) fn map_reply(response: SearchResponse) -> SearchReply {
    SearchReply {
        answer: response.response,
        results: response.results.into_iter().map(map_result).collect(),
        elapsed_ms: response.response_time_ms,
    }
}

fn map_result(wire: WireResult) -> ResultItem {
    ResultItem {
        id: wire.id,
        document_id: wire.document_id,
        filename: wire.filename,
        tags: ClassificationTags {
            application: wire.application,
            issue: wire.issue,
            ingredient: wire.ingredient,
        },
        source: SourceDetails {
            customer: wire.customer,
            trial_id: wire.trial_id,
            sheet_name: wire.sheet_name,
        },
        preview_text: wire.content_preview,
        relevance_score: wire.score,
        reranker_score: wire.reranker_score,
        viewing_hint: wire.blob_url,
    }
}

pub(crate) fn map_history(rows: Vec<WireHistoryItem>) -> Result<Vec<HistoryEntry>, GatewayError> {
    rows.into_iter()
        .map(|row| {
            let submitted_at = parse_timestamp(&row.created_at).ok_or_else(|| {
                GatewayError::new(
                    FailureKind::Decode,
                    format!("bad created_at timestamp {:?}", row.created_at),
                )
            })?;
            Ok(HistoryEntry {
                id: row.id,
                query_text: row.query,
                result_count: row.results_count,
                submitted_at,
                top_result_score: row.top_result_score,
                response_time_ms: row.response_time_ms,
            })
        })
        .collect()
}

pub(crate) fn map_facets(wire: WireFacets) -> Facets {
    Facets {
        applications: wire.applications,
        issues: wire.issues,
        ingredients: wire.ingredients,
    }
}

/// The backend stores naive timestamps; those are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn search_failure(err: &GatewayError) -> SearchFailure {
    let kind = match err.kind {
        FailureKind::Unauthorized => SearchFailureKind::Unauthorized,
        FailureKind::HttpStatus(code) => SearchFailureKind::HttpStatus(code),
        FailureKind::Timeout => SearchFailureKind::Timeout,
        FailureKind::Decode | FailureKind::TooLarge { .. } | FailureKind::InvalidUrl => {
            SearchFailureKind::InvalidResponse
        }
        FailureKind::Network => SearchFailureKind::Network,
    };
    SearchFailure::new(kind, Some(err.detail.clone().unwrap_or_else(|| err.message.clone())))
}

pub fn preview_failure(err: &GatewayError) -> PreviewFailure {
    match err.kind {
        FailureKind::HttpStatus(code) => PreviewFailure::from_status(code, err.detail.clone()),
        FailureKind::Unauthorized => PreviewFailure::from_status(401, err.detail.clone()),
        FailureKind::Timeout => PreviewFailure::timed_out(),
        _ => PreviewFailure::transport(err.message.clone()),
    }
}
