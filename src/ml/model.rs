use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::data::batcher::ClassificationBatch;
use crate::ml::evaluation::{preprocess_logits, ModelOutput};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TextClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
    #[config(default = 6)]
    pub num_classes: usize,
}

impl TextClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifier<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let classifier = LinearConfig::new(self.d_model, self.num_classes).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextClassifier {
            token_embedding, position_embedding, layers,
            final_norm, classifier, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `pad_mask`: [batch, seq_len], true at padding positions
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TextClassifier<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub classifier:         Linear<B>,
    pub dropout:            Dropout,
}

impl<B: Backend> TextClassifier<B> {
    /// input_ids, attention_mask: [batch, seq_len]
    /// → ScoresWithAux(logits [batch, num_classes], pooled [batch, d_model])
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> ModelOutput<Tensor<B, 2>> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let pad_mask = attention_mask.clone().equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        let pooled = masked_mean(x, attention_mask);
        let logits = self.classifier.forward(self.dropout.forward(pooled.clone()));

        ModelOutput::ScoresWithAux(logits, pooled)
    }

    /// Cross-entropy loss and class logits for one batch
    pub fn forward_classification(
        &self,
        batch: ClassificationBatch<B>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = preprocess_logits(self.forward(batch.input_ids, batch.attention_mask));
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.labels);
        (loss, logits)
    }
}

/// Average the hidden states of non-padding tokens.
/// x: [batch, seq_len, d_model], mask: [batch, seq_len] → [batch, d_model]
fn masked_mean<B: Backend>(x: Tensor<B, 3>, mask: Tensor<B, 2, Int>) -> Tensor<B, 2> {
    let [batch_size, seq_len, d_model] = x.dims();

    let mask = mask
        .float()
        .reshape([batch_size, seq_len, 1])
        .expand([batch_size, seq_len, d_model]);
    let summed = (x * mask.clone()).sum_dim(1);   // [batch, 1, d_model]
    // An all-padding row would divide by zero
    let counts = mask.sum_dim(1).clamp_min(1.0);  // [batch, 1, d_model]

    (summed / counts).reshape([batch_size, d_model])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::NUM_LABELS;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> TextClassifierConfig {
        TextClassifierConfig::new(20, 8, 16, 2, 2, 32, 0.0)
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: TextClassifier<TestBackend> = tiny_config().init(&device);

        let ids  = Tensor::<TestBackend, 1, Int>::from_ints([3, 4, 5, 0, 6, 7, 0, 0], &device)
            .reshape([2, 4]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 0, 1, 1, 0, 0], &device)
            .reshape([2, 4]);

        match model.forward(ids, mask) {
            ModelOutput::ScoresWithAux(logits, pooled) => {
                assert_eq!(logits.dims(), [2, NUM_LABELS]);
                assert_eq!(pooled.dims(), [2, 16]);
            }
            ModelOutput::ScoresOnly(_) => panic!("classifier should return pooled output"),
        }
    }

    #[test]
    fn test_padding_does_not_change_scores() {
        let device = Default::default();
        let model: TextClassifier<TestBackend> = tiny_config().init(&device);

        let short = Tensor::<TestBackend, 1, Int>::from_ints([3, 4], &device).reshape([1, 2]);
        let short_mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1], &device).reshape([1, 2]);
        let padded = Tensor::<TestBackend, 1, Int>::from_ints([3, 4, 0, 0], &device).reshape([1, 4]);
        let padded_mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 0, 0], &device).reshape([1, 4]);

        let a = preprocess_logits(model.forward(short, short_mask));
        let b = preprocess_logits(model.forward(padded, padded_mask));

        let diff: f32 = (a - b).abs().max().into_scalar().elem::<f32>();
        assert!(diff < 1e-4, "padding changed logits by {diff}");
    }

    #[test]
    fn test_masked_mean_ignores_padding() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0, 3.0, 100.0], &device)
            .reshape([1, 4, 1]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 0], &device)
            .reshape([1, 4]);

        let pooled: f32 = masked_mean(x, mask).into_scalar().elem::<f32>();
        assert!((pooled - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg  = tiny_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TextClassifierConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_classes, NUM_LABELS);
        assert_eq!(back.d_model, 16);
    }
}
