// Copyright 2016 The Cartographer Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ground-truth bounding boxes from a rendered instance id map.

use crate::errors::*;
use crate::TARGET_CATEGORY;
use fnv::FnvHashMap;
use image::DynamicImage;
use log::debug;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Write};
use std::iter::FromIterator;
use std::path::Path;

/// Row-major grid of instance ids, one per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceIdBuffer {
    width: u32,
    height: u32,
    ids: Vec<u32>,
}

impl InstanceIdBuffer {
    pub fn new(width: u32, height: u32, ids: Vec<u32>) -> Result<Self> {
        let expected_ids = width as usize * height as usize;
        if ids.len() != expected_ids {
            return Err(ErrorKind::BufferShape(
                (width, height),
                (width, height),
                expected_ids,
                ids.len(),
            )
            .into());
        }
        Ok(InstanceIdBuffer { width, height, ids })
    }

    /// A buffer with every pixel set to `id`.
    pub fn filled(width: u32, height: u32, id: u32) -> Self {
        InstanceIdBuffer {
            width,
            height,
            ids: vec![id; width as usize * height as usize],
        }
    }

    /// Reads the ids from an 8 or 16 bit grayscale image.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma16(buffer) => Self::new(
                buffer.width(),
                buffer.height(),
                buffer.pixels().map(|p| u32::from(p.0[0])).collect(),
            ),
            DynamicImage::ImageLuma8(buffer) => Self::new(
                buffer.width(),
                buffer.height(),
                buffer.pixels().map(|p| u32::from(p.0[0])).collect(),
            ),
            _ => invalid_config(
                "instance_image",
                "expected an 8 or 16 bit grayscale image",
            ),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn get(&self, column: u32, row: u32) -> u32 {
        self.ids[row as usize * self.width as usize + column as usize]
    }

    pub fn set(&mut self, column: u32, row: u32, id: u32) {
        self.ids[row as usize * self.width as usize + column as usize] = id;
    }

    /// Sets all pixels in the half-open ranges `[row_min, row_max)` x `[column_min, column_max)`.
    pub fn fill_rect(&mut self, rows: (u32, u32), columns: (u32, u32), id: u32) {
        for row in rows.0..rows.1.min(self.height) {
            for column in columns.0..columns.1.min(self.width) {
                self.set(column, row, id);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceAttributes {
    pub category_id: i32,
    pub name: String,
}

/// The renderer's list form of one attribute table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub idx: u32,
    pub category_id: i32,
    #[serde(default)]
    pub name: String,
}

/// Maps instance ids to their attributes. Serializes as a list of `{idx, category_id, name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AttributeEntry>", into = "Vec<AttributeEntry>")]
pub struct AttributeTable {
    entries: FnvHashMap<u32, InstanceAttributes>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, attributes: InstanceAttributes) {
        self.entries.insert(id, attributes);
    }

    pub fn get(&self, id: u32) -> Option<&InstanceAttributes> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl FromIterator<(u32, InstanceAttributes)> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = (u32, InstanceAttributes)>>(iter: I) -> Self {
        AttributeTable {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<AttributeEntry>> for AttributeTable {
    fn from(entries: Vec<AttributeEntry>) -> Self {
        entries
            .into_iter()
            .map(|e| {
                (
                    e.idx,
                    InstanceAttributes {
                        category_id: e.category_id,
                        name: e.name,
                    },
                )
            })
            .collect()
    }
}

impl From<AttributeTable> for Vec<AttributeEntry> {
    fn from(table: AttributeTable) -> Self {
        let mut entries: Vec<AttributeEntry> = table
            .entries
            .into_iter()
            .map(|(idx, a)| AttributeEntry {
                idx,
                category_id: a.category_id,
                name: a.name,
            })
            .collect();
        entries.sort_by_key(|e| e.idx);
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub class_id: i32,
    pub background_id: u32,
    /// Boxes narrower or lower than this fraction of the image are dropped.
    pub min_box_extent: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            class_id: TARGET_CATEGORY,
            background_id: 0,
            min_box_extent: 0.005,
        }
    }
}

impl AnnotationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0. ..1.).contains(&self.min_box_extent) {
            return invalid_config(
                "annotation.min_box_extent",
                format!("must be in [0, 1), got {}", self.min_box_extent),
            );
        }
        Ok(())
    }
}

/// A bounding box normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub class_id: i32,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for AnnotationRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.center_x, self.center_y, self.width, self.height
        )
    }
}

pub fn write_labels<W: Write>(mut writer: W, records: &[AnnotationRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    Ok(())
}

/// Inclusive pixel bounds of one instance.
#[derive(Debug, Clone, Copy)]
struct PixelBounds {
    column_min: u32,
    column_max: u32,
    row_min: u32,
    row_max: u32,
}

impl PixelBounds {
    fn new(column: u32, row: u32) -> Self {
        PixelBounds {
            column_min: column,
            column_max: column,
            row_min: row,
            row_max: row,
        }
    }

    fn grow(&mut self, column: u32, row: u32) {
        self.column_min = self.column_min.min(column);
        self.column_max = self.column_max.max(column);
        self.row_min = self.row_min.min(row);
        self.row_max = self.row_max.max(row);
    }
}

/// Boxes around every instance of `config.class_id` in `buffer`, in ascending id order. Ids
/// that are not in `attributes` are skipped. `width` x `height` are the declared image
/// dimensions and must match the buffer.
pub fn extract_annotations(
    buffer: &InstanceIdBuffer,
    attributes: &AttributeTable,
    config: &AnnotationConfig,
    width: u32,
    height: u32,
) -> Result<Vec<AnnotationRecord>> {
    config.validate()?;
    if (buffer.width(), buffer.height()) != (width, height) {
        return Err(ErrorKind::BufferShape(
            (width, height),
            (buffer.width(), buffer.height()),
            width as usize * height as usize,
            buffer.ids().len(),
        )
        .into());
    }

    let mut bounds: BTreeMap<u32, PixelBounds> = BTreeMap::new();
    for (i, &id) in buffer.ids().iter().enumerate() {
        if id == config.background_id {
            continue;
        }
        let column = (i % width as usize) as u32;
        let row = (i / width as usize) as u32;
        bounds
            .entry(id)
            .and_modify(|b| b.grow(column, row))
            .or_insert_with(|| PixelBounds::new(column, row));
    }

    let image_width = f64::from(width);
    let image_height = f64::from(height);
    let mut records = Vec::new();
    let mut num_unknown = 0;
    for (id, b) in bounds {
        match attributes.get(id) {
            None => {
                num_unknown += 1;
                continue;
            }
            Some(a) if a.category_id != config.class_id => continue,
            Some(_) => (),
        }
        // Pixel edges: the right and bottom edges lie one past the last covered pixel.
        let column_min = f64::from(b.column_min);
        let column_max = f64::from(b.column_max) + 1.;
        let row_min = f64::from(b.row_min);
        let row_max = f64::from(b.row_max) + 1.;
        let record = AnnotationRecord {
            class_id: config.class_id,
            center_x: (column_min + column_max) / 2. / image_width,
            center_y: (row_min + row_max) / 2. / image_height,
            width: (column_max - column_min) / image_width,
            height: (row_max - row_min) / image_height,
        };
        if record.width < config.min_box_extent || record.height < config.min_box_extent {
            continue;
        }
        records.push(record);
    }
    if num_unknown > 0 {
        debug!("Skipped {} instance ids without attributes.", num_unknown);
    }
    Ok(records)
}

/// Reads an instance id image and its attribute table from disk and extracts the boxes. The
/// image defines the dimensions.
pub fn extract_from_files(
    image_path: impl AsRef<Path>,
    attributes_path: impl AsRef<Path>,
    config: &AnnotationConfig,
) -> Result<Vec<AnnotationRecord>> {
    let image_path = image_path.as_ref();
    let image = image::open(image_path)
        .chain_err(|| format!("Could not read {}", image_path.display()))?;
    let buffer = InstanceIdBuffer::from_image(&image)?;
    let attributes = AttributeTable::from_json_file(attributes_path)?;
    extract_annotations(&buffer, &attributes, config, buffer.width(), buffer.height())
}
