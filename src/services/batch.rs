// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV bulk-upload parsing.
//!
//! The header row is validated up front; data rows are decoded lazily, one
//! at a time, and a row that fails to decode is yielded as an error without
//! stopping the iteration.

use crate::error::AppError;
use crate::models::BatchRow;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use std::io::Cursor;

/// Entry point for parsing uploads.
pub struct BatchIngestor;

impl BatchIngestor {
    /// Parse an uploaded CSV file.
    ///
    /// Fails with `MalformedInput` if the header cannot be decoded or has no
    /// `name` column. Individual rows are decoded when iterated.
    pub fn parse(bytes: impl Into<Vec<u8>>) -> Result<BatchRows, AppError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(Cursor::new(bytes.into()));

        let headers = reader
            .headers()
            .map_err(|e| AppError::MalformedInput(format!("Unreadable CSV header: {}", e)))?
            .clone();

        let columns = ColumnMap::from_headers(&headers);
        if columns.name.is_none() {
            return Err(AppError::MalformedInput(
                "CSV header has no 'name' column".to_string(),
            ));
        }

        tracing::debug!(columns = headers.len(), "Parsed CSV header");

        Ok(BatchRows {
            records: reader.into_records(),
            columns,
        })
    }
}

/// Lazy, finite, single-pass sequence of uploaded rows.
pub struct BatchRows {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    columns: ColumnMap,
}

impl Iterator for BatchRows {
    type Item = Result<BatchRow, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|r| self.columns.row(&r))
                .map_err(|e| format!("undecodable row: {}", e)),
        )
    }
}

/// Column positions for each known field.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    phone: Option<usize>,
    age: Option<usize>,
    gender: Option<usize>,
    goal: Option<usize>,
    bmi: Option<usize>,
    diet_type: Option<usize>,
    duration_label: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (idx, header) in headers.iter().enumerate() {
            let slot = match normalize_header(header).as_str() {
                "name" => &mut map.name,
                "phone" => &mut map.phone,
                "age" => &mut map.age,
                "gender" => &mut map.gender,
                "goal" => &mut map.goal,
                "bmi" => &mut map.bmi,
                "diettype" | "diet" => &mut map.diet_type,
                "duration" | "durationlabel" | "plantype" => &mut map.duration_label,
                _ => continue,
            };
            // First matching column wins
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    fn row(&self, record: &StringRecord) -> BatchRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        BatchRow {
            name: cell(self.name),
            phone: cell(self.phone),
            age: cell(self.age),
            gender: cell(self.gender),
            goal: cell(self.goal),
            bmi: cell(self.bmi),
            diet_type: cell(self.diet_type),
            duration_label: cell(self.duration_label),
        }
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
