//! Request construction for each dataset.
//!
//! Only already-resolved catalog positions are accepted here; mapping user
//! input to a position happens upstream.

use coastal_common::{
    CoastalError, CoastalResult, DatasetKind, ResourceRequest, SliceExpr, VariableSlice,
};
use opendap_parser::VariableNames;

use crate::config::{DimensionConfig, FetcherConfig};

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    names: VariableNames,
    dims: DimensionConfig,
}

impl RequestBuilder {
    pub fn new(endpoint: impl Into<String>, names: VariableNames, dims: DimensionConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            names,
            dims,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.parser.variables.clone(),
            config.dimensions.clone(),
        )
    }

    /// Axes plus `altitude[time][index][cross_shore]`.
    pub fn for_profile(&self, index: usize) -> CoastalResult<ResourceRequest> {
        let alongshore = self.position(index)?;
        let time = axis(self.dims.time_len, "time_len")?;
        let cross_shore = axis(self.dims.cross_shore_len, "cross_shore_len")?;
        Ok(self
            .request(DatasetKind::Profile)
            .with_variable(VariableSlice::whole(&self.names.cross_shore))
            .with_variable(VariableSlice::whole(&self.names.time))
            .with_variable(VariableSlice::new(
                &self.names.altitude,
                vec![time, alongshore, cross_shore],
            )))
    }

    pub fn for_catalog(&self) -> ResourceRequest {
        self.request(DatasetKind::Catalog)
            .with_variable(VariableSlice::whole(&self.names.id))
    }

    pub fn for_areas(&self) -> ResourceRequest {
        self.request(DatasetKind::Areas)
            .with_variable(VariableSlice::whole(&self.names.area_code))
            .with_variable(VariableSlice::whole(&self.names.area_name))
    }

    pub fn for_reference_points(&self, index: usize) -> CoastalResult<ResourceRequest> {
        let at = self.position(index)?;
        let mut request = self.request(DatasetKind::ReferencePoints);
        for name in [
            &self.names.rsp_x,
            &self.names.rsp_y,
            &self.names.rsp_lat,
            &self.names.rsp_lon,
        ] {
            request = request.with_variable(VariableSlice::new(name, vec![at]));
        }
        Ok(request)
    }

    pub fn for_water_levels(&self, index: usize) -> CoastalResult<ResourceRequest> {
        self.series(DatasetKind::WaterLevels, &self.names.water_levels, index)
    }

    pub fn for_coastline(&self, index: usize) -> CoastalResult<ResourceRequest> {
        self.series(DatasetKind::Coastline, &self.names.coastline, index)
    }

    /// Time axis plus `variable[time][index]` for each value variable.
    fn series(
        &self,
        kind: DatasetKind,
        variables: &[String],
        index: usize,
    ) -> CoastalResult<ResourceRequest> {
        let alongshore = self.position(index)?;
        let time = axis(self.dims.time_len, "time_len")?;
        let mut request = self
            .request(kind)
            .with_variable(VariableSlice::whole(&self.names.time));
        for name in variables {
            request = request.with_variable(VariableSlice::new(name, vec![time, alongshore]));
        }
        Ok(request)
    }

    fn request(&self, kind: DatasetKind) -> ResourceRequest {
        ResourceRequest::new(self.endpoint.clone(), kind)
    }

    fn position(&self, index: usize) -> CoastalResult<SliceExpr> {
        if index >= self.dims.alongshore_len {
            return Err(CoastalError::Config(format!(
                "catalog position {} out of range (0..{})",
                index, self.dims.alongshore_len
            )));
        }
        Ok(SliceExpr::Index(index))
    }
}

fn axis(len: usize, field: &str) -> CoastalResult<SliceExpr> {
    SliceExpr::all(len).ok_or_else(|| CoastalError::Config(format!("{} must be > 0", field)))
}
