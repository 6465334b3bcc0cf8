use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use packline_common::{AssetCategory, ChunkId, ChunkKind};
use packline_plugin::{AuxiliaryAsset, Hooks, OptimizeArgs, OptimizeStage};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use sugar_path::SugarPath;

use crate::{
  short_hash, BuildError, BuildResult, Chunk, ChunkGraph, FileNameTemplate, Graph, InputOptions,
  Manifest, OutputOptions, RenderOptions,
};

/// One physical file written by a build, with its final bytes. Compression
/// siblings are written to disk but not listed here.
#[derive(Debug)]
pub struct Asset {
  /// Logical, hash-free name (`app.js`, `logo.png`).
  pub name: String,
  /// Physical path relative to the output directory.
  pub path: String,
  pub category: AssetCategory,
  pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildStats {
  pub modules: usize,
  pub cache_hits: usize,
}

#[derive(Debug)]
pub struct BuildOutput {
  pub assets: Vec<Asset>,
  pub manifest: Manifest,
  pub stats: BuildStats,
}

/// An asset-to-be: rendered content plus the naming inputs. The physical
/// name is not known until after optimization, because the content hash is
/// taken over the bytes that actually hit disk.
struct Candidate {
  name: String,
  ext: String,
  category: AssetCategory,
  template: TemplateSlot,
  bytes: Vec<u8>,
  auxiliary: Vec<AuxiliaryAsset>,
}

#[derive(Clone, Copy)]
enum TemplateSlot {
  Entry,
  Chunk,
  Style,
  Static,
}

pub(crate) struct Emitter<'me> {
  graph: &'me Graph,
  chunk_graph: &'me ChunkGraph,
  input_opts: &'me InputOptions,
  output_opts: &'me OutputOptions,
  optimizers: &'me [Arc<dyn OptimizeStage>],
  hooks: &'me Hooks,
}

impl<'me> Emitter<'me> {
  pub(crate) fn new(
    graph: &'me Graph,
    chunk_graph: &'me ChunkGraph,
    input_opts: &'me InputOptions,
    output_opts: &'me OutputOptions,
    optimizers: &'me [Arc<dyn OptimizeStage>],
    hooks: &'me Hooks,
  ) -> Self {
    Self {
      graph,
      chunk_graph,
      input_opts,
      output_opts,
      optimizers,
      hooks,
    }
  }

  fn template(&self, slot: TemplateSlot) -> &FileNameTemplate {
    match slot {
      TemplateSlot::Entry => &self.output_opts.entry_file_names,
      TemplateSlot::Chunk => &self.output_opts.chunk_file_names,
      TemplateSlot::Style => &self.output_opts.style_file_names,
      TemplateSlot::Static => &self.output_opts.static_file_names,
    }
  }

  fn candidates_for_chunk(&self, chunk: &Chunk, out: &mut Vec<Candidate>) -> ChunkAssets {
    let rendered = chunk.render(&self.graph.module_by_id, self.input_opts.mode);

    let mut auxiliary = vec![];
    let mut statics = vec![];
    for module in chunk.ordered_modules(&self.graph.module_by_id) {
      auxiliary.extend(module.auxiliary.iter().cloned());
      if module.class.is_binary() {
        let path = module.id.as_path();
        let stem = path
          .file_stem()
          .and_then(|s| s.to_str())
          .unwrap_or("asset")
          .to_string();
        let ext = path
          .extension()
          .and_then(|e| e.to_str())
          .map(|e| format!(".{e}"))
          .unwrap_or_default();
        statics.push(out.len());
        out.push(Candidate {
          name: stem,
          ext,
          category: AssetCategory::Static,
          template: TemplateSlot::Static,
          bytes: module.content.as_bytes().to_vec(),
          auxiliary: vec![],
        });
      }
    }

    let script = out.len();
    out.push(Candidate {
      name: chunk.id.value().to_string(),
      ext: ".js".to_string(),
      category: AssetCategory::Script,
      template: if chunk.kind == ChunkKind::Entry {
        TemplateSlot::Entry
      } else {
        TemplateSlot::Chunk
      },
      bytes: rendered.script.into_bytes(),
      auxiliary,
    });

    let style = rendered.style.map(|style| {
      out.push(Candidate {
        name: chunk.id.value().to_string(),
        ext: ".css".to_string(),
        category: AssetCategory::Style,
        template: TemplateSlot::Style,
        bytes: style.into_bytes(),
        auxiliary: vec![],
      });
      out.len() - 1
    });

    ChunkAssets { script, style }
  }

  fn optimize(&self, candidates: &mut [Candidate]) -> BuildResult<()> {
    if !self.input_opts.mode.is_production() || self.optimizers.is_empty() {
      return Ok(());
    }
    candidates
      .par_iter_mut()
      .map(|candidate| {
        let logical = format!("{}{}", candidate.name, candidate.ext);
        // Pass order is fixed at configuration time; a failing pass fails
        // the whole asset rather than shipping half-optimized bytes.
        for stage in self.optimizers {
          if !stage.applies_to(candidate.category) {
            continue;
          }
          match stage.apply(OptimizeArgs {
            asset_name: &logical,
            bytes: &candidate.bytes,
          }) {
            Ok(Some(optimized)) => candidate.bytes = optimized,
            Ok(None) => {}
            Err(source) => {
              return Err(BuildError::optimize_failed(
                logical,
                stage.name().into_owned(),
                source,
              ));
            }
          }
        }
        Ok(())
      })
      .collect::<BuildResult<Vec<()>>>()?;
    Ok(())
  }

  fn prepare_dir(&self) -> BuildResult<()> {
    let dir = &self.output_opts.dir;
    if self.output_opts.clean && dir.exists() {
      std::fs::remove_dir_all(dir)
        .map_err(|e| BuildError::io_error(e).context(format!("clean {}", dir.display())))?;
    }
    std::fs::create_dir_all(dir)
      .map_err(|e| BuildError::io_error(e).context(format!("create {}", dir.display())))?;
    Ok(())
  }

  fn write_file(&self, relative: &str, bytes: &[u8]) -> BuildResult<()> {
    let path = self.output_opts.dir.join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)
      .map_err(|e| BuildError::io_error(e).context(format!("write {}", path.display())))?;
    Ok(())
  }

  fn wants_compression(&self, physical: &str, len: usize) -> bool {
    let ext = Path::new(physical)
      .extension()
      .and_then(|e| e.to_str())
      .unwrap_or("");
    self.output_opts.compression.extensions.contains(ext)
      && len as u64 >= self.output_opts.compression.min_size
  }

  /// Writes `.gz`/`.br` siblings next to eligible files. Runs under rayon;
  /// each sibling is independent.
  fn write_compression_siblings(&self, written: &[(String, Vec<u8>)]) -> BuildResult<()> {
    if !self.input_opts.mode.is_production() {
      return Ok(());
    }
    let codecs = self.output_opts.codecs;
    if !codecs.gzip && !codecs.brotli {
      return Ok(());
    }
    written
      .par_iter()
      .filter(|(physical, bytes)| self.wants_compression(physical, bytes.len()))
      .map(|(physical, bytes)| {
        if codecs.gzip {
          self.write_file(&format!("{physical}.gz"), &gzip(bytes)?)?;
        }
        if codecs.brotli {
          self.write_file(&format!("{physical}.br"), &brotli_compress(bytes)?)?;
        }
        Ok(())
      })
      .collect::<BuildResult<Vec<()>>>()?;
    Ok(())
  }

  /// The manifest lands last, atomically: readers never observe a manifest
  /// that references files not yet on disk.
  fn write_manifest(&self, manifest: &Manifest) -> BuildResult<String> {
    let json = manifest.to_json();
    let tmp = self.output_opts.dir.join("manifest.json.tmp");
    let target = self.output_opts.dir.join("manifest.json");
    std::fs::write(&tmp, json.as_bytes())
      .map_err(|e| BuildError::io_error(e).context(format!("write {}", tmp.display())))?;
    std::fs::rename(&tmp, &target)
      .map_err(|e| BuildError::io_error(e).context(format!("rename to {}", target.display())))?;
    Ok(json)
  }

  #[tracing::instrument(skip_all)]
  pub(crate) fn emit(self) -> BuildResult<BuildOutput> {
    let mut candidates: Vec<Candidate> = vec![];
    let mut chunk_assets: FxHashMap<ChunkId, ChunkAssets> = FxHashMap::default();
    for chunk in &self.chunk_graph.chunks {
      let assets = self.candidates_for_chunk(chunk, &mut candidates);
      chunk_assets.insert(chunk.id.clone(), assets);
    }

    self.optimize(&mut candidates)?;

    // Physical names are a function of the final bytes.
    let physical: Vec<String> = candidates
      .iter()
      .map(|candidate| {
        let hash = short_hash(&candidate.bytes);
        self.template(candidate.template).render(RenderOptions {
          name: Some(&candidate.name),
          id: Some(&candidate.name),
          hash: Some(&hash),
          ext: Some(&candidate.ext),
        })
      })
      .collect();

    self.prepare_dir()?;

    let mut manifest = Manifest::default();
    let mut written: Vec<(String, Vec<u8>)> = vec![];
    let mut assets: Vec<Asset> = vec![];

    for (candidate, physical) in candidates.into_iter().zip(physical.iter()) {
      self.hooks.run_pre_emit(physical);
      self.write_file(physical, &candidate.bytes)?;
      manifest.record_asset(
        format!("{}{}", candidate.name, candidate.ext),
        physical.clone(),
      );
      for aux in &candidate.auxiliary {
        let sibling = format!("{physical}{}", aux.suffix);
        self.write_file(&sibling, &aux.content)?;
        manifest.record_asset(
          format!("{}{}{}", candidate.name, candidate.ext, aux.suffix),
          sibling.clone(),
        );
        written.push((sibling, aux.content.clone()));
      }
      self.hooks.run_post_emit(physical);
      written.push((physical.clone(), candidate.bytes.clone()));
      assets.push(Asset {
        name: format!("{}{}", candidate.name, candidate.ext),
        path: physical.clone(),
        category: candidate.category,
        bytes: candidate.bytes,
      });
    }

    self.write_compression_siblings(&written)?;

    for (split_point, chunk_id) in &self.chunk_graph.split_point_to_chunk {
      let relative = Path::new(split_point.path())
        .relative(&self.input_opts.cwd)
        .to_string_lossy()
        .into_owned();
      manifest.record_chunk(relative, physical[chunk_assets[chunk_id].script].clone());
    }

    // Entry points list their assets in load order: required chunks (the
    // shared chunk) first, then the entry script, then stylesheets.
    for item in &self.input_opts.input {
      let Some(chunk) = self
        .chunk_graph
        .chunks
        .iter()
        .find(|c| c.kind == ChunkKind::Entry && c.id.value() == item.name)
      else {
        continue;
      };
      let own = &chunk_assets[&chunk.id];
      for required in &chunk.requires {
        manifest.record_entrypoint_asset(&item.name, physical[chunk_assets[required].script].clone());
      }
      manifest.record_entrypoint_asset(&item.name, physical[own.script].clone());
      for required in &chunk.requires {
        if let Some(style) = chunk_assets[required].style {
          manifest.record_entrypoint_asset(&item.name, physical[style].clone());
        }
      }
      if let Some(style) = own.style {
        manifest.record_entrypoint_asset(&item.name, physical[style].clone());
      }
    }

    self.write_manifest(&manifest)?;

    Ok(BuildOutput {
      assets,
      manifest,
      stats: BuildStats {
        modules: self.graph.len(),
        cache_hits: self.graph.cache_hits,
      },
    })
  }
}

/// Candidate indices for one chunk's outputs.
struct ChunkAssets {
  script: usize,
  style: Option<usize>,
}

fn gzip(bytes: &[u8]) -> BuildResult<Vec<u8>> {
  // Default gzip header carries mtime 0, keeping the sibling bytes a pure
  // function of the input.
  let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
  encoder.write_all(bytes)?;
  Ok(encoder.finish()?)
}

fn brotli_compress(bytes: &[u8]) -> BuildResult<Vec<u8>> {
  let mut out = Vec::new();
  {
    let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 11, 22);
    writer.write_all(bytes)?;
  }
  Ok(out)
}
