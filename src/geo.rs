use crate::stmt::Expr;
use crate::value::SqlValue;

/// A WGS-84 coordinate pair, stored as a `GEOMETRY(Point, 4326)` column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Point-construction expression for inserts and updates.
    /// `ST_MakePoint` takes longitude (X) first.
    #[must_use]
    pub(crate) fn to_expr(self) -> Expr {
        Expr::new(
            "ST_SetSRID(ST_MakePoint(?, ?), 4326)",
            vec![SqlValue::Float(self.lng), SqlValue::Float(self.lat)],
        )
    }
}

/// Projection fragments decomposing the stored point on read; both come back
/// NULL when the location is NULL.
pub(crate) const LAT_PROJECTION: &str = "ST_Y(location) AS lat";
pub(crate) const LNG_PROJECTION: &str = "ST_X(location) AS lng";

/// Axis-aligned bounding-box predicate, boundary-inclusive, in WGS-84
/// degrees. NULL locations never match.
pub(crate) fn bbox(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Expr {
    Expr::new(
        "location IS NOT NULL AND ST_Intersects(location, ST_MakeEnvelope(?, ?, ?, ?, 4326))",
        vec![
            SqlValue::Float(min_lng),
            SqlValue::Float(min_lat),
            SqlValue::Float(max_lng),
            SqlValue::Float(max_lat),
        ],
    )
}

/// Geodesic radius predicate, boundary-inclusive, radius in meters. The
/// geography cast makes the distance ellipsoidal rather than planar degrees.
/// NULL locations never match.
pub(crate) fn within_radius(lng: f64, lat: f64, radius_meters: f64) -> Expr {
    Expr::new(
        "location IS NOT NULL AND ST_DWithin(location::geography, (ST_SetSRID(ST_MakePoint(?, ?), 4326))::geography, ?)",
        vec![
            SqlValue::Float(lng),
            SqlValue::Float(lat),
            SqlValue::Float(radius_meters),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_expr_binds_longitude_first() {
        let expr = GeoPoint::new(50.45, 30.52).to_expr();
        assert_eq!(expr.sql, "ST_SetSRID(ST_MakePoint(?, ?), 4326)");
        assert_eq!(
            expr.params,
            vec![SqlValue::Float(30.52), SqlValue::Float(50.45)]
        );
    }

    #[test]
    fn bbox_predicate_guards_null_location() {
        let expr = bbox(30.0, 50.0, 31.0, 51.0);
        assert!(expr.sql.starts_with("location IS NOT NULL AND "));
        assert_eq!(expr.params.len(), 4);
    }

    #[test]
    fn radius_predicate_casts_to_geography() {
        let expr = within_radius(30.52, 50.45, 250.0);
        assert!(expr.sql.contains("ST_DWithin(location::geography"));
        assert_eq!(
            expr.params,
            vec![
                SqlValue::Float(30.52),
                SqlValue::Float(50.45),
                SqlValue::Float(250.0)
            ]
        );
    }
}
