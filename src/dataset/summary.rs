use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::Dataset;
use crate::config::{BRAND_MIN_MODELS, TOP_BRANDS, TOP_COMPANIES, TOP_ENGINES};
use crate::error::{AppError, Result};
use crate::types::PriceSegment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatCount {
    pub seats: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentStats {
    pub segment: PriceSegment,
    pub count: usize,
    pub percent: f64,
    pub mean_price: f64,
    pub median_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandMetrics {
    pub company: String,
    pub avg_price: f64,
    pub median_price: f64,
    pub model_count: usize,
    pub avg_hp: f64,
    pub avg_torque: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub top_companies: Vec<LabelCount>,
    pub fuel_type_share: Vec<LabelShare>,
    pub top_engines: Vec<LabelCount>,
    pub seat_distribution: Vec<SeatCount>,
    pub price_segments: Vec<SegmentStats>,
    pub brand_metrics: Vec<BrandMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` bin edges; the last bin includes its right edge.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        let rows = self.rows();
        let companies = value_counts(rows.iter().map(|r| r.company_names.as_str()));
        let engines = value_counts(rows.iter().map(|r| r.engines.as_str()));
        let fuels = value_counts(rows.iter().map(|r| r.fuel_types.as_str()));

        DatasetSummary {
            total_rows: rows.len(),
            top_companies: companies.into_iter().take(TOP_COMPANIES).collect(),
            fuel_type_share: fuels
                .into_iter()
                .map(|c| LabelShare {
                    percent: percent(c.count, rows.len()),
                    label: c.label,
                    count: c.count,
                })
                .collect(),
            top_engines: engines.into_iter().take(TOP_ENGINES).collect(),
            seat_distribution: self.seat_distribution(),
            price_segments: self.price_segments(),
            brand_metrics: self.brand_metrics(),
        }
    }

    fn seat_distribution(&self) -> Vec<SeatCount> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for r in self.rows().iter().filter(|r| r.seats.is_finite()) {
            *counts.entry(r.seats.round() as i64).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(seats, count)| SeatCount { seats, count })
            .collect()
    }

    fn price_segments(&self) -> Vec<SegmentStats> {
        let mut by_segment: BTreeMap<PriceSegment, Vec<f64>> = BTreeMap::new();
        for r in self.rows().iter().filter(|r| r.cars_prices.is_finite()) {
            by_segment
                .entry(PriceSegment::from_price(r.cars_prices))
                .or_default()
                .push(r.cars_prices);
        }
        let total = self.len();
        by_segment
            .into_iter()
            .map(|(segment, mut prices)| SegmentStats {
                segment,
                count: prices.len(),
                percent: percent(prices.len(), total),
                mean_price: mean(&prices).round(),
                median_price: median(&mut prices).round(),
            })
            .collect()
    }

    fn brand_metrics(&self) -> Vec<BrandMetrics> {
        let mut by_brand: HashMap<&str, Vec<&super::CarRow>> = HashMap::new();
        for r in self.rows() {
            by_brand.entry(r.company_names.as_str()).or_default().push(r);
        }
        let mut brands: Vec<BrandMetrics> = by_brand
            .into_iter()
            .filter(|(_, rows)| rows.len() >= BRAND_MIN_MODELS)
            .map(|(company, rows)| {
                let mut prices: Vec<f64> = rows.iter().map(|r| r.cars_prices).collect();
                let hp: Vec<f64> = rows.iter().map(|r| r.horsepower).collect();
                let torque: Vec<f64> = rows.iter().map(|r| r.torque).collect();
                BrandMetrics {
                    company: company.to_string(),
                    avg_price: mean(&prices).round(),
                    median_price: median(&mut prices).round(),
                    model_count: rows.len(),
                    avg_hp: mean(&hp).round(),
                    avg_torque: mean(&torque).round(),
                }
            })
            .collect();
        brands.sort_by(|a, b| {
            b.avg_price
                .total_cmp(&a.avg_price)
                .then_with(|| a.company.cmp(&b.company))
        });
        brands.truncate(TOP_BRANDS);
        brands
    }

    /// Equal-width histogram over the column's min..max.
    pub fn histogram(&self, column: &str, bins: usize) -> Result<Histogram> {
        let values = self
            .column(column)
            .ok_or_else(|| AppError::UnknownColumn(column.to_string()))?;
        let bins = bins.max(1);
        if values.is_empty() {
            return Ok(Histogram {
                column: column.to_string(),
                edges: Vec::new(),
                counts: Vec::new(),
            });
        }

        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Histogram {
            column: column.to_string(),
            edges,
            counts,
        })
    }
}

/// Counts per label, most frequent first, ties by label.
fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for l in labels {
        *counts.entry(l).or_default() += 1;
    }
    let mut out: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
