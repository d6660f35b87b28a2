use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model scoring failed: {0}")]
    Score(String),

    #[error("probability computation failed: {0}")]
    Probability(String),

    #[error("bad model input: {0}")]
    Input(String),
}

/// Model that yields a class label for a tabular feature vector.
pub trait Scored: Send + Sync {
    fn score(&self, features: &[f64]) -> Result<i64, ModelError>;
}

/// Model that can additionally report per-class probabilities. The highest
/// probability is used as the verdict confidence.
pub trait Probabilistic: Scored {
    fn class_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Model scoring a decoded image, returning a single scalar in [0, 1].
pub trait ImageScored: Send + Sync {
    fn score_image(&self, image: &ImageTensor) -> Result<f64, ModelError>;
}

/// Dense HWC image buffer handed to image-family models.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Result<Self, ModelError> {
        let expected = (width * height * channels) as usize;
        if data.len() != expected {
            return Err(ModelError::Input(format!(
                "image buffer holds {} values, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Uniform-random tensor standing in for a real capture when a caller
    /// supplies no image (demo behavior).
    pub fn random(width: u32, height: u32, channels: u32) -> Self {
        let mut rng = rand::thread_rng();
        let len = (width * height * channels) as usize;
        let data = (0..len).map(|_| rng.gen::<f32>()).collect();
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
