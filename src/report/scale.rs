//! Position scales for the comparison plot

/// Base-10 log scale mapping a positive domain onto a pixel range
#[derive(Clone, Copy, Debug)]
pub struct ScaleLog {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLog {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Smallest whole-decade domain covering `[min, max]`
    ///
    /// Both bounds must be positive. A range inside one decade is widened
    /// to a full decade so the axis always shows two ticks.
    pub fn decade_domain(min: f64, max: f64) -> (f64, f64) {
        let lo = (min.log10() + 1e-9).floor();
        let mut hi = (max.log10() - 1e-9).ceil();
        if hi <= lo {
            hi = lo + 1.0;
        }
        (10f64.powf(lo), 10f64.powf(hi))
    }

    /// Maps a value from domain space into range space
    ///
    /// Non-positive inputs map to the start of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if x <= 0.0 || d0 <= 0.0 || d1 <= 0.0 {
            return r0;
        }
        let ld0 = d0.log10();
        let denom = d1.log10() - ld0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x.log10() - ld0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Powers of ten inside the domain
    pub fn ticks(&self) -> Vec<f64> {
        let (mut min, mut max) = self.domain;
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        if min <= 0.0 || !min.is_finite() || !max.is_finite() {
            return Vec::new();
        }
        // tolerate log10 landing just off an exact power
        let min_e = (min.log10() - 1e-9).ceil() as i32;
        let max_e = (max.log10() + 1e-9).floor() as i32;
        (min_e..=max_e).map(|e| 10f64.powi(e)).collect()
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Discrete band scale: `count` equal bands with padding between them
#[derive(Clone, Copy, Debug)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        (r1 - r0).abs() / denom
    }

    /// Left edge of band `index`
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        r0.min(r1) + bw * self.padding_outer + step * index as f64
    }

    pub fn center(&self, index: usize) -> f64 {
        self.x(index) + self.band_width() / 2.0
    }
}
