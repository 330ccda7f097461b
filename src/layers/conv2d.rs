use log::debug;

use crate::error::{KernelError, Result};
use crate::math::volume::{Kernel, Volume};

/// Direct 2D convolution (cross-correlation, as in the usual deep-learning
/// convention) with symmetric zero padding.
///
/// Padding is never materialised: taps that land outside the input are
/// skipped, which is the same as multiplying by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2d {
    pub kernel: Kernel,
    pub bias: Option<Vec<f64>>,
    pub stride: usize,
    pub padding: usize,
}

impl Conv2d {
    pub fn new(kernel: Kernel, bias: Option<Vec<f64>>, stride: usize, padding: usize) -> Result<Conv2d> {
        if stride == 0 {
            return Err(KernelError::input("stride must be at least 1"));
        }
        if let Some(b) = &bias {
            if b.len() != kernel.out_channels {
                return Err(KernelError::shape(
                    format!("bias of length {} (one per output channel)", kernel.out_channels),
                    format!("length {}", b.len()),
                ));
            }
        }
        Ok(Conv2d { kernel, bias, stride, padding })
    }

    /// `(out_h, out_w)` for an `height × width` input:
    /// `(H + 2·pad − kH) / stride + 1`, floor division.
    pub fn output_size(&self, height: usize, width: usize) -> Result<(usize, usize)> {
        let padded = |len: usize| {
            self.padding.checked_mul(2)
                .and_then(|p| len.checked_add(p))
                .filter(|&v| isize::try_from(v).is_ok())
                .ok_or_else(|| KernelError::input(format!("padding {} is too large", self.padding)))
        };
        let (padded_h, padded_w) = (padded(height)?, padded(width)?);
        if padded_h < self.kernel.kernel_h || padded_w < self.kernel.kernel_w {
            return Err(KernelError::shape(
                format!("padded input of at least {}x{}", self.kernel.kernel_h, self.kernel.kernel_w),
                format!("{padded_h}x{padded_w}"),
            ));
        }
        Ok((
            (padded_h - self.kernel.kernel_h) / self.stride + 1,
            (padded_w - self.kernel.kernel_w) / self.stride + 1,
        ))
    }

    pub fn forward(&self, input: &Volume) -> Result<Volume> {
        let k = &self.kernel;
        if input.channels != k.in_channels {
            return Err(KernelError::shape(
                format!("{} input channels (kernel depth)", k.in_channels),
                format!("{} channels", input.channels),
            ));
        }
        let (out_h, out_w) = self.output_size(input.height, input.width)?;
        debug!(
            "conv2d forward: input {:?}, kernel {}x{}x{}x{}, stride {}, padding {} -> {}x{}x{}",
            input.shape(), k.out_channels, k.in_channels, k.kernel_h, k.kernel_w,
            self.stride, self.padding, k.out_channels, out_h, out_w,
        );

        let pad = self.padding as isize;
        let (h, w) = (input.height as isize, input.width as isize);
        k.out_channels.checked_mul(out_h)
            .and_then(|n| n.checked_mul(out_w))
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f64>())
            .ok_or_else(|| KernelError::input(format!(
                "output of {}x{}x{} is too large", k.out_channels, out_h, out_w
            )))?;
        let mut output = Volume::zeros(k.out_channels, out_h, out_w);

        for oc in 0..k.out_channels {
            let start = self.bias.as_ref().map_or(0.0, |b| b[oc]);
            for oh in 0..out_h {
                for ow in 0..out_w {
                    let mut acc = start;
                    for ic in 0..k.in_channels {
                        for kh in 0..k.kernel_h {
                            let ih = (oh * self.stride + kh) as isize - pad;
                            if ih < 0 || ih >= h {
                                continue;
                            }
                            for kw in 0..k.kernel_w {
                                let iw = (ow * self.stride + kw) as isize - pad;
                                if iw < 0 || iw >= w {
                                    continue;
                                }
                                acc += input.get(ic, ih as usize, iw as usize) * k.get(oc, ic, kh, kw);
                            }
                        }
                    }
                    output.set(oc, oh, ow, acc);
                }
            }
        }

        Ok(output)
    }
}
