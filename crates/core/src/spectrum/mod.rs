use crate::{Result, VisualiserError};

/// Magnitudes are quantised to signed 8-bit; heights are expressed as a
/// fraction of this full-scale value.
pub const FULL_SCALE: f32 = 128.0;

/// Magnitude substituted for values that overflow the signed 8-bit range.
const OVERFLOW_MAGNITUDE: u8 = 127;

/// One frame of frequency-domain data: interleaved signed 8-bit real and
/// imaginary parts, one pair per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencySnapshot<'a> {
    bytes: &'a [i8],
}

impl<'a> FrequencySnapshot<'a> {
    pub fn new(bytes: &'a [i8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(VisualiserError::InvalidInput(
                "frequency snapshot needs at least one real/imaginary pair",
            ));
        }
        if bytes.len() % 2 != 0 {
            return Err(VisualiserError::InvalidInput(
                "frequency snapshot length must be even",
            ));
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &'a [i8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of real/imaginary pairs in the snapshot.
    pub fn bin_count(&self) -> usize {
        self.bytes.len() / 2
    }
}

/// One frame of time-domain data as unsigned 8-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformSnapshot<'a> {
    samples: &'a [u8],
}

impl<'a> WaveformSnapshot<'a> {
    pub fn new(samples: &'a [u8]) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &'a [u8] {
        self.samples
    }
}

/// Picks the bin stride for a requested column count.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagnitudeSampler;

impl MagnitudeSampler {
    /// Resamples `snapshot` onto `column_count` columns.
    ///
    /// When few columns are requested only the lower half of the spectrum is
    /// spread across them, which keeps the low and mid frequencies where most
    /// musical energy sits. Requests beyond one column per bin are clamped to
    /// the bin count; callers must lay out [`SampledSpectrum::columns`], not
    /// the requested value.
    pub fn sample<'a>(
        snapshot: FrequencySnapshot<'a>,
        column_count: usize,
    ) -> Result<SampledSpectrum<'a>> {
        if column_count == 0 {
            return Err(VisualiserError::InvalidInput(
                "column count must be at least one",
            ));
        }

        let len = snapshot.len();
        let quarter = len / 4;
        let (columns, stride) = if column_count <= quarter {
            (column_count, (quarter / column_count) * 2)
        } else if column_count <= len / 2 {
            (column_count, 2)
        } else {
            tracing::trace!(
                requested = column_count,
                clamped = len / 2,
                "column count exceeds snapshot bins"
            );
            (len / 2, 2)
        };

        Ok(SampledSpectrum {
            snapshot,
            columns,
            stride,
        })
    }
}

/// A snapshot viewed through an effective column count and stride.
#[derive(Debug, Clone, Copy)]
pub struct SampledSpectrum<'a> {
    snapshot: FrequencySnapshot<'a>,
    columns: usize,
    stride: usize,
}

impl<'a> SampledSpectrum<'a> {
    /// Effective column count after clamping.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Distance in bytes between the pairs read for adjacent columns.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Magnitude of column `index`, in `[0, 128)`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.columns()`.
    pub fn magnitude(&self, index: usize) -> u8 {
        assert!(index < self.columns, "column {index} out of range");
        let offset = self.stride * index;
        let real = self.snapshot.bytes[offset];
        let imag = self.snapshot.bytes[offset + 1];
        quantise_magnitude(real, imag)
    }

    /// Height of column `index` for a drawable range of `max_height`.
    pub fn column_height(&self, index: usize, max_height: f32) -> f32 {
        f32::from(self.magnitude(index)) * (max_height / FULL_SCALE)
    }

    pub fn magnitudes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.columns).map(move |index| self.magnitude(index))
    }
}

/// `hypot` rounded and wrapped into a signed byte. Wrapped (negative) values
/// come from loud bins and are pinned to the top of the range instead of 0.
pub fn quantise_magnitude(real: i8, imag: i8) -> u8 {
    let hypot = f64::from(real).hypot(f64::from(imag)).round();
    let wrapped = hypot as i32 as i8;
    if wrapped < 0 {
        OVERFLOW_MAGNITUDE
    } else {
        wrapped as u8
    }
}
