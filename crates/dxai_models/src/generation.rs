//! Seeded autoregressive decoding.

use burn::prelude::*;
use dxai_core::{build_prompt, extract_response, GenerationSettings, NarrativeError, Seed};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{ModelError, Result};
use crate::tokenizer::Tokenizer;
use crate::vlm::DentalVlm;

/// Pick the next token from the logits of the last position.
///
/// The repetition penalty divides positive logits and multiplies negative
/// ones for every token already in `history`. Greedy decoding returns the
/// argmax of the penalized logits; sampling applies temperature and top-k
/// before drawing from the softmax.
pub fn select_next_token<R: Rng + ?Sized>(
    mut logits: Vec<f32>,
    history: &[u32],
    settings: &GenerationSettings,
    rng: &mut R,
) -> u32 {
    if settings.repetition_penalty != 1.0 {
        for &id in history {
            if let Some(logit) = logits.get_mut(id as usize) {
                *logit = if *logit > 0.0 {
                    *logit / settings.repetition_penalty
                } else {
                    *logit * settings.repetition_penalty
                };
            }
        }
    }

    if !settings.do_sample {
        return argmax(&logits);
    }

    let temperature = settings.temperature.max(1e-5);
    let mut scaled: Vec<(usize, f32)> = logits
        .iter()
        .enumerate()
        .map(|(i, &l)| (i, l / temperature))
        .collect();

    if settings.top_k > 0 && settings.top_k < scaled.len() {
        scaled.sort_by(|a, b| b.1.total_cmp(&a.1));
        scaled.truncate(settings.top_k);
    }

    let max = scaled.iter().map(|(_, l)| *l).fold(f32::NEG_INFINITY, f32::max);
    let weights: Vec<f32> = scaled.iter().map(|(_, l)| (l - max).exp()).collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => scaled[dist.sample(rng)].0 as u32,
        Err(_) => argmax(&logits),
    }
}

fn argmax(values: &[f32]) -> u32 {
    values
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0 as u32
}

/// Extend `prompt_ids` until `<eos>`, the token budget or the context limit.
///
/// The vision tower runs once; each step re-runs the decoder over the whole
/// sequence. Returns the prompt followed by the generated ids.
pub fn generate<B: Backend>(
    model: &DentalVlm<B>,
    pixels: Tensor<B, 4>,
    prompt_ids: &[u32],
    tokenizer: &Tokenizer,
    settings: &GenerationSettings,
    seed: Seed,
) -> Result<Vec<u32>> {
    let image_token = tokenizer.image_token_id();
    let eos = tokenizer.eos_token_id();
    let max_positions = model.decoder.max_positions();

    let features = model.vision_features(pixels);
    let [_, n_image, _] = features.dims();
    let mut rng = seed.to_rng();
    let mut ids = prompt_ids.to_vec();

    for _ in 0..settings.max_new_tokens {
        if DentalVlm::<B>::sequence_len(&ids, image_token, n_image) >= max_positions {
            tracing::debug!("Context limit of {} positions reached", max_positions);
            break;
        }

        let logits = model.forward_from_features(features.clone(), &ids, image_token)?;
        let [_, seq, vocab] = logits.dims();
        let last = logits
            .slice([0..1, seq - 1..seq, 0..vocab])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ModelError::Tensor(format!("{e:?}")))?;

        let next = select_next_token(last, &ids, settings, &mut rng);
        ids.push(next);
        if next == eos {
            break;
        }
    }

    Ok(ids)
}

/// Generate a narrative for one radiograph.
///
/// Builds the chat prompt, decodes and returns the text after the assistant
/// marker.
pub fn narrate<B: Backend>(
    model: &DentalVlm<B>,
    tokenizer: &Tokenizer,
    pixels: Tensor<B, 4>,
    instruction: &str,
    settings: &GenerationSettings,
    seed: Seed,
) -> std::result::Result<String, NarrativeError> {
    let prompt = build_prompt(instruction);
    let prompt_ids = tokenizer.encode(&prompt, true);

    let ids = generate(model, pixels, &prompt_ids, tokenizer, settings, seed)
        .map_err(|e| NarrativeError::Generation(e.to_string()))?;

    tracing::debug!(
        "Raw decoded output: {}",
        tokenizer.decode(&ids, false)
    );

    extract_response(&tokenizer.decode(&ids, true), instruction)
}
