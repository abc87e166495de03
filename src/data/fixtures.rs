// Small on-disk corpus for tests: label stores, per-video
// audio CSVs, face and text .npy files for all three splits.

use ndarray::{Array, Array2, Array3};
use ndarray_npy::write_npy;
use serde_json::{json, Map, Value};
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

use crate::data::sources::SourceEnv;
use crate::domain::{
    layout::{CorpusLayout, ModalityLengths},
    split::Split,
};
use crate::infra::cache::ArtifactCache;

pub const LABELS: [&str; 6] = [
    "extraversion",
    "neuroticism",
    "agreeableness",
    "conscientiousness",
    "interview",
    "openness",
];

pub struct Fixture {
    _root:         TempDir,
    data_dir:      PathBuf,
    embedding_dir: PathBuf,
    cache_dir:     PathBuf,
    pub layout:    CorpusLayout,
}

impl Fixture {
    pub const AUDIO_DIM: usize = 3;
    pub const FACE_DIM:  usize = 2;
    pub const TEXT_DIM:  usize = 3;

    pub fn layout() -> CorpusLayout {
        CorpusLayout {
            train_size: 4,
            valid_size: 2,
            test_size:  2,
            lengths:    ModalityLengths::new(6, 5, 4),
        }
    }

    pub fn build() -> Self {
        let root = TempDir::new().unwrap();
        let fx = Self {
            data_dir:      root.path().join("data"),
            embedding_dir: root.path().join("embeddings"),
            cache_dir:     root.path().join("cache"),
            _root:         root,
            layout:        Self::layout(),
        };
        for split in Split::ALL {
            fx.write_split(split);
        }
        fx
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn embedding_dir(&self) -> &Path {
        &self.embedding_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Sorted sample keys of `split`.
    pub fn samples(&self, split: Split) -> Vec<String> {
        (0..self.layout.expected_size(split))
            .map(|i| format!("{split}.{i:03}"))
            .collect()
    }

    pub fn env<'a>(&'a self, cache: &'a ArtifactCache) -> SourceEnv<'a> {
        SourceEnv {
            data_dir:      &self.data_dir,
            embedding_dir: &self.embedding_dir,
            layout:        &self.layout,
            cache,
        }
    }

    /// Overwrite the label store of `split` with `names` as columns.
    pub fn write_labels(&self, split: Split, names: &[&str]) {
        let mut store = Map::new();
        for (k, name) in names.iter().enumerate() {
            let mut column = Map::new();
            for (i, sample) in self.samples(split).iter().enumerate() {
                column.insert(format!("{sample}.mp4"), json!((i + k) as f64 / 8.0));
            }
            store.insert((*name).to_string(), Value::Object(column));
        }
        fs::create_dir_all(self.data_dir()).unwrap();
        fs::write(
            self.data_dir().join(split.label_store_name()),
            serde_json::to_string_pretty(&Value::Object(store)).unwrap(),
        )
        .unwrap();
    }

    /// Raw audio table written for sample `i`.
    pub fn audio_sequence(&self, i: usize) -> Array2<f64> {
        let len = 2 + i % (self.layout.lengths.audio - 1);
        Array::from_shape_fn((len, Self::AUDIO_DIM), |(t, d)| {
            ((i * 31 + t * 7 + d * 3) % 17) as f64 * 0.5 + d as f64
        })
    }

    fn write_split(&self, split: Split) {
        self.write_labels(split, &LABELS);

        let text_dir = self.embedding_dir().join("text").join(split.as_str());
        fs::create_dir_all(&text_dir).unwrap();

        for (i, sample) in self.samples(split).iter().enumerate() {
            let dir = self.data_dir().join(split.as_str()).join(sample);

            // audio
            let audio_dir = dir.join("egemaps");
            fs::create_dir_all(&audio_dir).unwrap();
            write_csv(&audio_dir.join("lld.csv"), &self.audio_sequence(i));

            // face
            let face_dir = dir.join("fi_face_resnet18");
            fs::create_dir_all(&face_dir).unwrap();
            let face_len = 1 + i % self.layout.lengths.face;
            let face = Array::from_shape_fn((face_len, Self::FACE_DIM), |(t, d)| (i + t + d) as f32);
            write_npy(face_dir.join("features.npy"), &face).unwrap();

            // text, stored with a leading unit axis
            let text_len = 1 + i % self.layout.lengths.text;
            let text = Array3::from_shape_fn((1, text_len, Self::TEXT_DIM), |(_, t, d)| {
                (i * 10 + t) as f32 - d as f32
            });
            write_npy(text_dir.join(format!("{sample}_bertemd.npy")), &text).unwrap();
        }
    }
}

fn write_csv(path: &Path, table: &Array2<f64>) {
    let mut out = (0..table.ncols())
        .map(|d| format!("lld_{d}"))
        .collect::<Vec<_>>()
        .join(";");
    out.push('\n');
    for row in table.rows() {
        let line = row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(";");
        writeln!(out, "{line}").unwrap();
    }
    fs::write(path, out).unwrap();
}
