use super::SongRecord;
use crate::engine::TableRow;
use crate::error::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Row of `artists.parquet`. One per song record, not deduplicated.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&SongRecord> for ArtistRow {
    fn from(record: &SongRecord) -> Self {
        ArtistRow {
            artist_id: record.artist_id.clone(),
            name: record.artist_name.clone(),
            location: record.artist_location.clone(),
            latitude: record.artist_latitude,
            longitude: record.artist_longitude,
        }
    }
}

pub fn artists_table(records: &[SongRecord]) -> Vec<ArtistRow> {
    records.iter().map(ArtistRow::from).collect()
}

impl TableRow for ArtistRow {
    const PARTITION_BY: &'static [&'static str] = &[];

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let artist_id: StringArray = rows.iter().map(|r| Some(r.artist_id.as_str())).collect();
        let name: StringArray = rows.iter().map(|r| Some(r.name.as_str())).collect();
        let location: StringArray = rows.iter().map(|r| r.location.as_deref()).collect();
        let latitude: Float64Array = rows.iter().map(|r| r.latitude).collect();
        let longitude: Float64Array = rows.iter().map(|r| r.longitude).collect();
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(artist_id) as ArrayRef,
                Arc::new(name),
                Arc::new(location),
                Arc::new(latitude),
                Arc::new(longitude),
            ],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    fn record(latitude: Option<f64>, longitude: Option<f64>) -> SongRecord {
        SongRecord {
            song_id: "SOMZWCG12A8C13C480".to_string(),
            title: "I Didn't Mean To".to_string(),
            artist_id: "ARD7TVE1187B99BFB1".to_string(),
            artist_name: "Casual".to_string(),
            year: 0,
            duration: 218.93179,
            artist_location: Some("California - LA".to_string()),
            artist_latitude: latitude,
            artist_longitude: longitude,
            num_songs: Some(1),
        }
    }

    #[test]
    fn renames_artist_fields() {
        let row = ArtistRow::from(&record(Some(35.14968), Some(-90.04892)));
        assert_eq!(
            row,
            ArtistRow {
                artist_id: "ARD7TVE1187B99BFB1".to_string(),
                name: "Casual".to_string(),
                location: Some("California - LA".to_string()),
                latitude: Some(35.14968),
                longitude: Some(-90.04892),
            }
        );
        assert!(row.partition_values().is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let records = vec![record(None, None), record(None, None)];
        assert_eq!(artists_table(&records).len(), 2);
    }

    #[test]
    fn null_coordinates_stay_null() {
        let row = ArtistRow::from(&record(None, None));
        let batch = ArtistRow::to_batch(&[&row]).unwrap();
        assert!(batch.column(3).is_null(0));
        assert!(batch.column(4).is_null(0));
        assert!(!batch.column(2).is_null(0));
    }
}
