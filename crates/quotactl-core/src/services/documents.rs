//! Quota file reading and writing
//!
//! Snapshot files are JSON arrays of project documents; reference files are
//! either a single document or a bare `quotas` mapping. Everything is written
//! back as two-space indented JSON.

use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::models::{ProjectQuotaDocument, QuotaSet, ReferenceDocument};

/// Parse a snapshot file
pub fn load_documents<R: Read>(reader: R, source: &str) -> Result<Vec<ProjectQuotaDocument>> {
    let documents: Vec<ProjectQuotaDocument> = serde_json::from_reader(reader)
        .map_err(|e| Error::malformed(format!("{}: expected a list of project quotas: {}", source, e)))?;
    log::debug!("[quotactl:documents] loaded {} projects from {}", documents.len(), source);
    Ok(documents)
}

/// Parse a reference file, accepting a full document or a bare quotas mapping
pub fn load_reference<R: Read>(reader: R, source: &str) -> Result<ReferenceDocument> {
    let value: Value = serde_json::from_reader(reader)
        .map_err(|e| Error::malformed(format!("{}: invalid JSON: {}", source, e)))?;

    let Some(object) = value.as_object() else {
        return Err(Error::malformed(format!(
            "{}: reference must be a JSON object",
            source
        )));
    };

    if object.contains_key("quotas") {
        let document: ProjectQuotaDocument = serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("{}: invalid reference document: {}", source, e)))?;
        log::debug!("[quotactl:documents] reference is project {}", document.label());
        Ok(ReferenceDocument::Document(document))
    } else {
        let quotas: QuotaSet = serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("{}: invalid reference quotas: {}", source, e)))?;
        log::debug!("[quotactl:documents] reference is a bare quotas mapping");
        Ok(ReferenceDocument::Bare(quotas))
    }
}

/// Write `value` as indented JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
