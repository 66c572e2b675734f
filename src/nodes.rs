use crate::error::{Result, SplineError};

/// Backing store of one node array.
///
/// A node set either owns its arrays or writes into buffers lent by the
/// caller. The two never mix inside one [`NodeSet`]: [`NodeSet::reserve`]
/// switches every array to owned storage, [`NodeSet::reserve_external`]
/// switches every array to borrowed storage.
#[derive(Debug)]
pub enum NodeBuffer<'a> {
    Owned(Vec<f64>),
    External(&'a mut [f64]),
}

impl<'a> NodeBuffer<'a> {
    pub fn capacity(&self) -> usize {
        match self {
            NodeBuffer::Owned(values) => values.len(),
            NodeBuffer::External(values) => values.len(),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, NodeBuffer::External(_))
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            NodeBuffer::Owned(values) => values,
            NodeBuffer::External(values) => values,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            NodeBuffer::Owned(values) => values,
            NodeBuffer::External(values) => values,
        }
    }

    fn ensure(&mut self, capacity: usize) -> Result<()> {
        match self {
            NodeBuffer::Owned(values) => {
                if values.len() < capacity {
                    values.resize(capacity, 0.0);
                }
                Ok(())
            }
            NodeBuffer::External(values) => {
                if values.len() < capacity {
                    Err(SplineError::CapacityExceeded { capacity: values.len() })
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Default for NodeBuffer<'_> {
    fn default() -> Self {
        NodeBuffer::Owned(Vec::new())
    }
}

impl Clone for NodeBuffer<'_> {
    /// Cloning always yields owned storage.
    fn clone(&self) -> Self {
        NodeBuffer::Owned(self.as_slice().to_vec())
    }
}

/// Borrowed buffers handed to [`NodeSet::reserve_external`].
pub struct ExternalBuffers<'a> {
    pub x: &'a mut [f64],
    pub y: &'a mut [f64],
    pub yp: &'a mut [f64],
    pub ypp: Option<&'a mut [f64]>,
}

/// Abscissas, ordinates and the derivative arrays computed from them.
///
/// `Yp`/`Ypp` are only meaningful while [`NodeSet::is_built`] holds; every
/// mutation of `X` or `Y` clears that flag.
#[derive(Debug, Clone, Default)]
pub struct NodeSet<'a> {
    x: NodeBuffer<'a>,
    y: NodeBuffer<'a>,
    yp: NodeBuffer<'a>,
    ypp: NodeBuffer<'a>,
    npts: usize,
    built: bool,
}

impl<'a> NodeSet<'a> {
    pub fn new() -> Self {
        NodeSet::default()
    }

    /// Switches to owned storage for `n` points and forgets the current ones.
    pub fn reserve(&mut self, n: usize) {
        self.x = NodeBuffer::Owned(vec![0.0; n]);
        self.y = NodeBuffer::Owned(vec![0.0; n]);
        self.yp = NodeBuffer::Owned(vec![0.0; n]);
        self.ypp = NodeBuffer::Owned(Vec::new());
        self.npts = 0;
        self.built = false;
    }

    /// Switches to caller owned storage for `n` points.
    ///
    /// Every buffer must hold at least `n` values. Without a `Ypp` buffer the
    /// node set cannot back a quintic spline.
    pub fn reserve_external(&mut self, n: usize, buffers: ExternalBuffers<'a>) -> Result<()> {
        let ExternalBuffers { x, y, yp, ypp } = buffers;
        check_len("X", n, x.len())?;
        check_len("Y", n, y.len())?;
        check_len("Yp", n, yp.len())?;
        if let Some(ypp) = &ypp {
            check_len("Ypp", n, ypp.len())?;
        }
        self.x = NodeBuffer::External(x);
        self.y = NodeBuffer::External(y);
        self.yp = NodeBuffer::External(yp);
        self.ypp = match ypp {
            Some(ypp) => NodeBuffer::External(ypp),
            None => NodeBuffer::External(&mut []),
        };
        self.npts = 0;
        self.built = false;
        Ok(())
    }

    pub fn is_external(&self) -> bool {
        self.x.is_external()
    }

    pub fn capacity(&self) -> usize {
        self.x.capacity().min(self.y.capacity())
    }

    pub fn len(&self) -> usize {
        self.npts
    }

    pub fn is_empty(&self) -> bool {
        self.npts == 0
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }

    pub fn x(&self) -> &[f64] {
        &self.x.as_slice()[..self.npts]
    }

    pub fn y(&self) -> &[f64] {
        &self.y.as_slice()[..self.npts]
    }

    /// First derivatives; empty until a cubic family build sized them.
    pub fn yp(&self) -> &[f64] {
        let yp = self.yp.as_slice();
        &yp[..self.npts.min(yp.len())]
    }

    pub fn ypp(&self) -> &[f64] {
        let ypp = self.ypp.as_slice();
        &ypp[..self.npts.min(ypp.len())]
    }

    /// Read access to `X`, `Y` next to write access to `Yp` and `Ypp`.
    pub(crate) fn split_mut(&mut self) -> (&[f64], &[f64], &mut [f64], &mut [f64]) {
        let n = self.npts;
        let ypp = self.ypp.as_mut_slice();
        let ypp_len = n.min(ypp.len());
        (
            &self.x.as_slice()[..n],
            &self.y.as_slice()[..n],
            &mut self.yp.as_mut_slice()[..n],
            &mut ypp[..ypp_len],
        )
    }

    pub(crate) fn x_mut(&mut self) -> &mut [f64] {
        &mut self.x.as_mut_slice()[..self.npts]
    }

    pub(crate) fn yp_mut(&mut self) -> &mut [f64] {
        let n = self.npts;
        &mut self.yp.as_mut_slice()[..n]
    }

    pub(crate) fn ypp_mut(&mut self) -> &mut [f64] {
        let ypp = self.ypp.as_mut_slice();
        let n = self.npts.min(ypp.len());
        &mut ypp[..n]
    }

    /// Makes `Yp` (and `Ypp` when `second` is set) as long as the node arrays.
    pub(crate) fn ensure_derivatives(&mut self, second: bool) -> Result<()> {
        let n = self.npts;
        self.yp.ensure(n).map_err(|_| SplineError::DimensionMismatch {
            what: "Yp",
            expected: n,
            found: self.yp.capacity(),
        })?;
        if second {
            self.ypp.ensure(n).map_err(|_| SplineError::DimensionMismatch {
                what: "Ypp",
                expected: n,
                found: self.ypp.capacity(),
            })?;
        }
        Ok(())
    }

    fn grow_for(&mut self, n: usize) -> Result<()> {
        if n <= self.capacity() {
            return Ok(());
        }
        let capacity = match self.x {
            NodeBuffer::Owned(_) => n.max(2 * self.capacity()).max(16),
            NodeBuffer::External(_) => n,
        };
        self.x.ensure(capacity)?;
        self.y.ensure(capacity)?;
        self.yp.ensure(capacity)?;
        Ok(())
    }

    /// Appends a node. Abscissas may repeat (a new monotone run starts) but
    /// never decrease.
    pub fn push(&mut self, x: f64, y: f64) -> Result<()> {
        if !x.is_finite() {
            return Err(SplineError::NonFiniteInput { what: "X", index: self.npts });
        }
        if !y.is_finite() {
            return Err(SplineError::NonFiniteInput { what: "Y", index: self.npts });
        }
        if let Some(&previous) = self.x().last() {
            if x < previous {
                return Err(SplineError::NonMonotoneNodes {
                    index: self.npts,
                    previous,
                    current: x,
                });
            }
        }
        self.grow_for(self.npts + 1)?;
        let n = self.npts;
        self.x.as_mut_slice()[n] = x;
        self.y.as_mut_slice()[n] = y;
        self.npts += 1;
        self.built = false;
        Ok(())
    }

    /// Appends a node together with its first derivative.
    pub fn push_hermite(&mut self, x: f64, y: f64, yp: f64) -> Result<()> {
        if !yp.is_finite() {
            return Err(SplineError::NonFiniteInput { what: "Yp", index: self.npts });
        }
        self.push(x, y)?;
        self.yp.as_mut_slice()[self.npts - 1] = yp;
        Ok(())
    }

    pub fn drop_back(&mut self) {
        if self.npts > 0 {
            self.npts -= 1;
            self.built = false;
        }
    }

    pub fn clear(&mut self) {
        self.npts = 0;
        self.built = false;
    }

    /// Replaces the content with `n` strided samples `x[k * incx]`, `y[k * incy]`.
    pub fn load(&mut self, x: &[f64], incx: usize, y: &[f64], incy: usize, n: usize) -> Result<()> {
        check_strided("X", x, incx, n)?;
        check_strided("Y", y, incy, n)?;
        self.clear();
        self.grow_for(n)?;
        for k in 0..n {
            self.push(x[k * incx], y[k * incy])?;
        }
        Ok(())
    }

    pub fn load_hermite(&mut self, x: &[f64], y: &[f64], yp: &[f64]) -> Result<()> {
        let n = x.len();
        check_len("Y", n, y.len())?;
        check_len("Yp", n, yp.len())?;
        self.clear();
        self.grow_for(n)?;
        for k in 0..n {
            self.push_hermite(x[k], y[k], yp[k])?;
        }
        Ok(())
    }

    /// Start indices of the maximal strictly increasing runs, plus `len()` as
    /// a final sentinel.
    pub fn runs(&self) -> Vec<usize> {
        let x = self.x();
        let mut starts = vec![0];
        for k in 1..x.len() {
            if x[k - 1] >= x[k] {
                starts.push(k);
            }
        }
        starts.push(x.len());
        starts
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if found < expected {
        return Err(SplineError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

fn check_strided(what: &'static str, values: &[f64], inc: usize, n: usize) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    let needed = (n - 1) * inc.max(1) + 1;
    if inc == 0 || values.len() < needed {
        return Err(SplineError::DimensionMismatch { what, expected: needed, found: values.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_storage_grows() {
        let mut nodes = NodeSet::new();
        for k in 0..40 {
            nodes.push(k as f64, (k * k) as f64).unwrap();
        }
        assert_eq!(nodes.len(), 40);
        assert!(nodes.capacity() >= 40);
        assert_eq!(nodes.y()[7], 49.0);
        assert!(!nodes.is_external());
    }

    #[test]
    fn push_rejects_decreasing_abscissa() {
        let mut nodes = NodeSet::new();
        nodes.push(1.0, 0.0).unwrap();
        nodes.push(1.0, 2.0).unwrap();
        assert_eq!(
            nodes.push(0.5, 0.0),
            Err(SplineError::NonMonotoneNodes { index: 2, previous: 1.0, current: 0.5 })
        );
        assert!(matches!(nodes.push(f64::NAN, 0.0), Err(SplineError::NonFiniteInput { .. })));
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn external_storage_does_not_grow() {
        let (mut x, mut y, mut yp) = ([0.0; 3], [0.0; 3], [0.0; 3]);
        {
            let mut nodes = NodeSet::new();
            nodes
                .reserve_external(3, ExternalBuffers { x: &mut x, y: &mut y, yp: &mut yp, ypp: None })
                .unwrap();
            for k in 0..3 {
                nodes.push(k as f64, 2.0 * k as f64).unwrap();
            }
            assert!(nodes.is_external());
            assert_eq!(nodes.push(3.0, 6.0), Err(SplineError::CapacityExceeded { capacity: 3 }));
            assert!(nodes.ensure_derivatives(true).is_err());
            assert!(nodes.ensure_derivatives(false).is_ok());
        }
        assert_eq!(y, [0.0, 2.0, 4.0]);
    }

    #[test]
    fn strided_load_and_runs() {
        let x = [0.0, -1.0, 1.0, -1.0, 1.0, -1.0, 2.0, -1.0];
        let y = [5.0, 6.0, 7.0, 8.0];
        let mut nodes = NodeSet::new();
        nodes.load(&x, 2, &y, 1, 4).unwrap();
        assert_eq!(nodes.x(), &[0.0, 1.0, 1.0, 2.0]);
        assert_eq!(nodes.runs(), vec![0, 2, 4]);
        assert!(nodes.load(&x, 2, &y, 1, 5).is_err());
    }
}
