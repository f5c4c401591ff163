use std::collections::HashMap;

use serde::Serialize;

use crate::color::Rgb;
use crate::sample::{ColorSampleGrid, Position};

/// Every grid position that shares one exact color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRecord {
    pub color: Rgb,
    pub count: usize,
    pub positions: Vec<Position>,
}

/// Groups grid cells by color, most frequent first.
///
/// Colors with equal counts keep the order in which a row-major scan first
/// met them, so the result is fully determined by the grid.
pub fn frequency_index(grid: &ColorSampleGrid) -> Vec<FrequencyRecord> {
    let mut slots: HashMap<Rgb, usize> = HashMap::new();
    let mut records: Vec<FrequencyRecord> = Vec::new();

    for (position, color) in grid.cells() {
        let slot = *slots.entry(color).or_insert_with(|| {
            records.push(FrequencyRecord {
                color,
                count: 0,
                positions: Vec::new(),
            });
            records.len() - 1
        });
        let record = &mut records[slot];
        record.count += 1;
        record.positions.push(position);
    }

    // stable: ties stay in first-seen order
    records.sort_by(|a, b| b.count.cmp(&a.count));
    log::debug!(
        "indexed {} cells into {} distinct colors",
        grid.len(),
        records.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    #[test]
    fn counts_and_orders_by_frequency() {
        let grid = ColorSampleGrid::from_rows(&[vec![BLUE, RED], vec![RED, GREEN]]).expect("grid");
        let records = frequency_index(&grid);

        let summary: Vec<(Rgb, usize)> = records.iter().map(|r| (r.color, r.count)).collect();
        assert_eq!(summary, vec![(RED, 2), (BLUE, 1), (GREEN, 1)]);
        assert_eq!(
            records[0].positions,
            vec![Position { x: 1, y: 0 }, Position { x: 0, y: 1 }]
        );
    }

    #[test]
    fn ties_follow_row_major_first_occurrence() {
        let grid = ColorSampleGrid::from_rows(&[vec![GREEN, BLUE], vec![RED, GREEN]]).expect("grid");
        let order: Vec<Rgb> = frequency_index(&grid).iter().map(|r| r.color).collect();
        assert_eq!(order, vec![GREEN, BLUE, RED]);

        let column = ColorSampleGrid::from_rows(&[vec![BLUE], vec![RED]]).expect("grid");
        let order: Vec<Rgb> = frequency_index(&column).iter().map(|r| r.color).collect();
        assert_eq!(order, vec![BLUE, RED]);
    }

    #[test]
    fn records_partition_the_grid() {
        let cells: Vec<Rgb> = (0..60u32)
            .map(|i| Rgb::new((i % 7) as u8 * 30, (i % 3) as u8 * 80, 0))
            .collect();
        let grid = ColorSampleGrid::from_colors(10, 6, cells).expect("grid");
        let records = frequency_index(&grid);

        let total: usize = records.iter().map(|r| r.count).sum();
        assert_eq!(total, 60);

        let mut seen: Vec<Position> = records.iter().flat_map(|r| r.positions.clone()).collect();
        seen.sort_by_key(|p| (p.y, p.x));
        seen.dedup();
        assert_eq!(seen.len(), 60);

        for record in &records {
            assert_eq!(record.count, record.positions.len());
            for pos in &record.positions {
                assert_eq!(grid.get(pos.x, pos.y), Some(record.color));
            }
        }
    }
}
