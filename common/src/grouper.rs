//! 画像名によるレコードのグループ化

use crate::types::{ImageGroup, Record};
use std::collections::HashMap;
use tracing::debug;

/// レコードを画像名ごとにまとめる
///
/// - 画像名が空・欠落しているレコードは除外（エラーにはしない）
/// - グループ内のレコードは読み込み順を保持
/// - グループの並びは画像名の初出順
pub fn group_records(records: Vec<Record>, image_id_field: &str) -> Vec<ImageGroup> {
    let mut groups: Vec<ImageGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(name) = record.image_id(image_id_field).map(str::to_string) else {
            dropped += 1;
            continue;
        };

        let slot = *index.entry(name.clone()).or_insert_with(|| {
            groups.push(ImageGroup::new(name));
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    debug!(groups = groups.len(), dropped, "レコードをグループ化");
    groups
}
