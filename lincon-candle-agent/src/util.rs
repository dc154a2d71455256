//! Utilities.
use anyhow::{anyhow, Context, Result};
use candle_core::Tensor;
use candle_nn::VarMap;
use log::trace;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("dest");
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    trace!("src");
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .with_context(|| format!("{} is not in the source variables", k_dest))?;
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = ((tau * t_src)? + ((1.0 - tau) * t_dest)?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Stacks rows of values into an `f32` tensor of shape `(rows.len(), dim)`.
///
/// Each row is the concatenation of the corresponding rows of `parts`.
pub(crate) fn rows_to_tensor(
    parts: &[&[Vec<f64>]],
    dim: usize,
    device: &candle_core::Device,
) -> Result<Tensor> {
    let n = parts.first().map(|p| p.len()).unwrap_or(0);
    let mut data = Vec::with_capacity(n * dim);
    for i in 0..n {
        for part in parts.iter() {
            data.extend(part[i].iter().map(|&x| x as f32));
        }
    }
    if data.len() != n * dim {
        return Err(anyhow!(
            "{} values for {} rows of dimension {}",
            data.len(),
            n,
            dim
        ));
    }
    Ok(Tensor::from_vec(data, (n, dim), device)?)
}
