//! Region-local inputs shared read-only by every worker of a job.

use geo_common::{HourlyField, Raster, ResourceError, Result, Technology, HOURS_PER_YEAR};
use grid_index::ResampleMap;
use resource_model::{
    csp_capacity_factor, pv_capacity_factor, CspParams, PowerCurve, PvParams, SolarGeometry,
    SolarGeometryRequest, SolarPixelInputs,
};

/// Technology-specific data needed to evaluate one hour.
#[derive(Debug, Clone)]
pub enum ModelInputs {
    Pv {
        geometry: SolarGeometryRequest,
        clearness: HourlyField,
        temperature: HourlyField,
        ross: Raster<f32>,
        albedo: Raster<f32>,
        params: PvParams,
    },
    Csp {
        geometry: SolarGeometryRequest,
        clearness: HourlyField,
        params: CspParams,
    },
    Wind {
        technology: Technology,
        wind_speed: HourlyField,
        correction: Raster<f32>,
        curve: PowerCurve,
    },
}

impl ModelInputs {
    pub fn technology(&self) -> Technology {
        match self {
            Self::Pv { .. } => Technology::Pv,
            Self::Csp { .. } => Technology::Csp,
            Self::Wind { technology, .. } => *technology,
        }
    }

    /// Clearness field for solar technologies.
    pub fn clearness(&self) -> Option<&HourlyField> {
        match self {
            Self::Pv { clearness, .. } | Self::Csp { clearness, .. } => Some(clearness),
            Self::Wind { .. } => None,
        }
    }

    fn fields(&self) -> Vec<(&'static str, &HourlyField)> {
        match self {
            Self::Pv {
                clearness,
                temperature,
                ..
            } => vec![("CLEARNESS", clearness), ("T2M", temperature)],
            Self::Csp { clearness, .. } => vec![("CLEARNESS", clearness)],
            Self::Wind { wind_speed, .. } => vec![("W50M", wind_speed)],
        }
    }

    fn rasters(&self) -> Vec<(&'static str, &Raster<f32>)> {
        match self {
            Self::Pv { ross, albedo, .. } => vec![("ross", ross), ("albedo", albedo)],
            Self::Csp { .. } => Vec::new(),
            Self::Wind { correction, .. } => vec![("wind correction", correction)],
        }
    }

    fn geometry(&self) -> Option<&SolarGeometryRequest> {
        match self {
            Self::Pv { geometry, .. } | Self::Csp { geometry, .. } => Some(geometry),
            Self::Wind { .. } => None,
        }
    }
}

/// Everything a worker reads for one region and technology.
///
/// Output pixels are row-major over `shape`; `weather_index[i]` is the
/// offset of pixel `i`'s weather cell within one hour of the weather fields.
#[derive(Debug, Clone)]
pub struct RegionInputs {
    shape: (usize, usize),
    mask: Raster<u8>,
    mask_count: usize,
    weather_index: Vec<usize>,
    model: ModelInputs,
}

impl RegionInputs {
    /// Assemble and check the inputs of a job.
    ///
    /// # Arguments
    /// * `mask` - Region mask at output resolution; any nonzero value counts as inside
    /// * `weather_index` - Weather cell of each output pixel
    /// * `model` - Weather slices, rasters and parameters of the technology
    pub fn new(mask: Raster<u8>, weather_index: Vec<usize>, model: ModelInputs) -> Result<Self> {
        let mask = mask.map(|m| u8::from(m != 0));
        let shape = mask.shape();
        let n = mask.len();
        if weather_index.len() != n {
            return Err(ResourceError::missing_data(format!(
                "weather index has {} entries for {} pixels",
                weather_index.len(),
                n
            )));
        }

        let mut plane = None;
        for (name, field) in model.fields() {
            if field.hours() != HOURS_PER_YEAR {
                return Err(ResourceError::missing_data(format!(
                    "{} has {} hours, expected {}",
                    name,
                    field.hours(),
                    HOURS_PER_YEAR
                )));
            }
            let this = (field.rows(), field.cols());
            match plane {
                None => plane = Some(this),
                Some(p) if p != this => {
                    return Err(ResourceError::missing_data(format!(
                        "{} is {}x{}, other weather fields are {}x{}",
                        name, this.0, this.1, p.0, p.1
                    )))
                }
                Some(_) => {}
            }
        }
        let plane_len = plane.map(|(r, c)| r * c).unwrap_or(0);
        if let Some(&bad) = weather_index.iter().find(|&&w| w >= plane_len) {
            return Err(ResourceError::missing_data(format!(
                "weather index {} outside weather slice of {} cells",
                bad, plane_len
            )));
        }

        for (name, raster) in model.rasters() {
            raster.ensure_shape(shape.0, shape.1, name)?;
        }
        if let Some(request) = model.geometry() {
            if request.shape() != shape {
                return Err(ResourceError::invalid_window(format!(
                    "solar geometry is {:?}, region is {:?}",
                    request.shape(),
                    shape
                )));
            }
        }

        let mask_count = mask.data().iter().filter(|&&m| m == 1).count();
        Ok(Self {
            shape,
            mask,
            mask_count,
            weather_index,
            model,
        })
    }

    /// Weather cell of each output pixel through a resample map.
    pub fn grid_weather_index(map: &ResampleMap) -> Vec<usize> {
        let (rows, cols) = map.fine_shape();
        let mut index = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                index.push(map.coarse_index(r, c));
            }
        }
        index
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn mask(&self) -> &Raster<u8> {
        &self.mask
    }

    /// Number of pixels inside the region.
    pub fn mask_count(&self) -> usize {
        self.mask_count
    }

    pub fn technology(&self) -> Technology {
        self.model.technology()
    }

    pub fn model(&self) -> &ModelInputs {
        &self.model
    }

    /// Capacity factor of every output pixel at `hour`, before masking.
    pub fn capacity_factors(&self, hour: usize, out: &mut [f64]) -> Result<()> {
        if hour >= HOURS_PER_YEAR {
            return Err(ResourceError::missing_data(format!(
                "hour {} outside the modelled year",
                hour
            )));
        }
        if out.len() != self.len() {
            return Err(ResourceError::missing_data(format!(
                "output buffer has {} values, expected {}",
                out.len(),
                self.len()
            )));
        }

        match &self.model {
            ModelInputs::Pv {
                geometry,
                clearness,
                temperature,
                ross,
                albedo,
                params,
            } => {
                let sun = SolarGeometry::compute(hour, geometry)?;
                let (k, t) = (clearness.hour(hour), temperature.hour(hour));
                for (i, px) in sun.pixels().iter().enumerate() {
                    let w = self.weather_index[i];
                    let inputs = SolarPixelInputs {
                        clearness: k[w] as f64,
                        temperature_k: t[w] as f64,
                        ross: ross.data()[i] as f64,
                        albedo: albedo.data()[i] as f64,
                    };
                    out[i] = pv_capacity_factor(px, &inputs, params);
                }
            }
            ModelInputs::Csp {
                geometry,
                clearness,
                params,
            } => {
                let sun = SolarGeometry::compute(hour, geometry)?;
                let k = clearness.hour(hour);
                for (i, px) in sun.pixels().iter().enumerate() {
                    out[i] = csp_capacity_factor(px, k[self.weather_index[i]] as f64, params);
                }
            }
            ModelInputs::Wind {
                wind_speed,
                correction,
                curve,
                ..
            } => {
                let w50m = wind_speed.hour(hour);
                for (i, cf) in out.iter_mut().enumerate() {
                    let speed = w50m[self.weather_index[i]] as f64 * correction.data()[i] as f64;
                    *cf = curve.capacity_factor(speed);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_model::TurbineParams;

    fn wind(speed: f32, rows: usize, cols: usize) -> ModelInputs {
        ModelInputs::Wind {
            technology: Technology::WindOn,
            wind_speed: HourlyField::from_fn(1, 1, HOURS_PER_YEAR, move |_, _, _| speed),
            correction: Raster::filled(rows, cols, 1.0),
            curve: PowerCurve::new(&TurbineParams::onshore()).unwrap(),
        }
    }

    #[test]
    fn test_wind_capacity_factors() {
        let inputs = RegionInputs::new(Raster::filled(2, 2, 1), vec![0; 4], wind(13.0, 2, 2)).unwrap();
        let mut out = vec![0.0; 4];
        inputs.capacity_factors(10, &mut out).unwrap();
        assert_eq!(out, vec![1.0; 4]);
        assert_eq!(inputs.mask_count(), 4);
        assert_eq!(inputs.technology(), Technology::WindOn);
    }

    #[test]
    fn test_shape_checks() {
        // Correction raster does not match the mask.
        assert!(RegionInputs::new(Raster::filled(2, 2, 1), vec![0; 4], wind(5.0, 3, 2)).is_err());
        // Weather index too short.
        assert!(RegionInputs::new(Raster::filled(2, 2, 1), vec![0; 3], wind(5.0, 2, 2)).is_err());
        // Weather index outside the 1x1 weather slice.
        assert!(RegionInputs::new(Raster::filled(2, 2, 1), vec![0, 0, 0, 1], wind(5.0, 2, 2)).is_err());
    }

    #[test]
    fn test_nonzero_mask_values_count_as_inside() {
        let mask = Raster::new(1, 3, vec![2, 0, 255]).unwrap();
        let inputs = RegionInputs::new(mask, vec![0; 3], wind(13.0, 1, 3)).unwrap();
        assert_eq!(inputs.mask().data(), &[1, 0, 1]);
        assert_eq!(inputs.mask_count(), 2);
    }

    #[test]
    fn test_hour_outside_year_is_an_error() {
        let inputs = RegionInputs::new(Raster::filled(1, 1, 1), vec![0], wind(5.0, 1, 1)).unwrap();
        let mut out = vec![0.0];
        assert!(matches!(
            inputs.capacity_factors(HOURS_PER_YEAR, &mut out),
            Err(ResourceError::MissingData(_))
        ));
    }
}
