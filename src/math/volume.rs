use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};

/// Channel × row × column volume stored flat in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    data: Vec<f64>,
}

impl Volume {
    pub fn zeros(channels: usize, height: usize, width: usize) -> Volume {
        Volume { channels, height, width, data: vec![0.0; channels * height * width] }
    }

    /// Builds a volume from `[channel][row][col]` nesting.
    ///
    /// Every channel must have the same number of rows and every row the same
    /// number of columns.
    pub fn from_nested(nested: Vec<Vec<Vec<f64>>>) -> Result<Volume> {
        let channels = nested.len();
        let height = nested.first().map_or(0, |c| c.len());
        let width = nested.first().and_then(|c| c.first()).map_or(0, |r| r.len());

        let mut data = Vec::with_capacity(channels * height * width);
        for (c, plane) in nested.into_iter().enumerate() {
            if plane.len() != height {
                return Err(KernelError::shape(
                    format!("{height} rows per channel"),
                    format!("{} rows in channel {c}", plane.len()),
                ));
            }
            for (r, row) in plane.into_iter().enumerate() {
                if row.len() != width {
                    return Err(KernelError::shape(
                        format!("{width} columns per row"),
                        format!("{} columns in channel {c} row {r}", row.len()),
                    ));
                }
                data.extend(row);
            }
        }

        Ok(Volume { channels, height, width, data })
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    #[inline]
    pub fn get(&self, c: usize, r: usize, col: usize) -> f64 {
        self.data[(c * self.height + r) * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, c: usize, r: usize, col: usize, value: f64) {
        self.data[(c * self.height + r) * self.width + col] = value;
    }

    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        if self.height == 0 || self.width == 0 {
            return vec![vec![vec![]; self.height]; self.channels];
        }
        self.data
            .chunks(self.height * self.width)
            .map(|plane| plane.chunks(self.width).map(|row| row.to_vec()).collect())
            .collect()
    }
}

/// Convolution weights shaped `[out_channels][in_channels][kernel_h][kernel_w]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    pub out_channels: usize,
    pub in_channels: usize,
    pub kernel_h: usize,
    pub kernel_w: usize,
    data: Vec<f64>,
}

impl Kernel {
    pub fn from_nested(nested: Vec<Vec<Vec<Vec<f64>>>>) -> Result<Kernel> {
        let out_channels = nested.len();
        let mut per_out = Vec::with_capacity(out_channels);
        for (o, filters) in nested.into_iter().enumerate() {
            let vol = Volume::from_nested(filters).map_err(|e| match e {
                KernelError::InvalidShape { expected, actual } => KernelError::shape(
                    expected,
                    format!("{actual} of output channel {o}"),
                ),
                other => other,
            })?;
            per_out.push(vol);
        }

        let [in_channels, kernel_h, kernel_w] = per_out.first().map_or([0, 0, 0], |v| v.shape());
        if let Some((o, v)) = per_out.iter().enumerate().find(|(_, v)| v.shape() != [in_channels, kernel_h, kernel_w]) {
            return Err(KernelError::shape(
                format!("filter shape {:?}", [in_channels, kernel_h, kernel_w]),
                format!("{:?} for output channel {o}", v.shape()),
            ));
        }

        if [out_channels, in_channels, kernel_h, kernel_w].contains(&0) {
            return Err(KernelError::input(format!(
                "kernel dimensions must be non-zero, got {:?}",
                [out_channels, in_channels, kernel_h, kernel_w],
            )));
        }

        let data = per_out.into_iter().flat_map(|v| v.data).collect();
        Ok(Kernel { out_channels, in_channels, kernel_h, kernel_w, data })
    }

    /// 1×1 kernel mapping every input channel straight to the same output channel.
    pub fn identity(channels: usize) -> Kernel {
        let mut data = vec![0.0; channels * channels];
        for c in 0..channels {
            data[c * channels + c] = 1.0;
        }
        Kernel { out_channels: channels, in_channels: channels, kernel_h: 1, kernel_w: 1, data }
    }

    #[inline]
    pub fn get(&self, o: usize, i: usize, kh: usize, kw: usize) -> f64 {
        self.data[((o * self.in_channels + i) * self.kernel_h + kh) * self.kernel_w + kw]
    }
}
