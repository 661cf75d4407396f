use crate::error::{AppError, AppResult};
use ndarray::{Array, Array2, Axis};
use ndarray_stats::SummaryStatisticsExt;

/// Weighted mean of a set of equally sized vectors, e.g. token embeddings
/// pooled into one sentence embedding.
pub fn mean(embeddings: Vec<Vec<f32>>, weights: Vec<f32>) -> AppResult<Vec<f32>> {
    let num_embeddings = embeddings.len();
    let embedding_dim = embeddings
        .first()
        .map(Vec::len)
        .ok_or_else(|| AppError::Embedding("cannot pool an empty set of vectors".to_string()))?;
    if weights.len() != num_embeddings {
        return Err(AppError::Embedding(format!(
            "{} weights supplied for {} vectors",
            weights.len(),
            num_embeddings
        )));
    }

    let flat_embeddings: Vec<f32> = embeddings.into_iter().flatten().collect();
    let array = Array2::from_shape_vec((num_embeddings, embedding_dim), flat_embeddings)
        .map_err(|e| AppError::Embedding(format!("ragged embedding rows: {}", e)))?;

    let weights = Array::from_vec(weights);
    let mean_embedding = array
        .weighted_mean_axis(Axis(0), &weights)
        .map_err(|e| AppError::Embedding(format!("error computing mean: {}", e)))?;

    let (v, _) = mean_embedding.into_raw_vec_and_offset();
    Ok(v)
}

/// Unweighted mean pooling.
pub fn mean_pool(embeddings: Vec<Vec<f32>>) -> AppResult<Vec<f32>> {
    let weights = vec![1.0; embeddings.len()];
    mean(embeddings, weights)
}
