//! Fixtures for tests and benches: real class files and jars built in memory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_STATIC_FINAL: u16 = 0x0018;
const ACC_SUPER: u16 = 0x0020;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_ANNOTATION: u16 = 0x2000;

/// Builds a minimal but well-formed class file.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    name: String,
    access: u16,
    super_name: String,
    interfaces: Vec<String>,
    dependencies: Vec<String>,
    fields: Vec<(String, String)>,
    /// `(name, descriptor, code)`
    methods: Vec<(String, String, Vec<u8>)>,
    ints: Vec<i32>,
    longs: Vec<i64>,
    source_retention: bool,
}

impl ClassFileBuilder {
    /// `name` is a binary name such as `com.x.A`.
    pub fn new(name: &str) -> Self {
        Self {
            name: internal(name),
            access: ACC_PUBLIC | ACC_SUPER,
            super_name: "java/lang/Object".to_string(),
            interfaces: Vec::new(),
            dependencies: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            ints: Vec::new(),
            longs: Vec::new(),
            source_retention: false,
        }
    }

    /// Referenced through a `CONSTANT_Class` entry.
    pub fn depends_on(mut self, name: &str) -> Self {
        self.dependencies.push(internal(name));
        self
    }

    /// Set the superclass.
    pub fn extends(mut self, name: &str) -> Self {
        self.super_name = internal(name);
        self
    }

    /// A `static final` field with the given descriptor, e.g. `Lcom/x/B;`.
    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push((name.to_string(), descriptor.to_string()));
        self
    }

    /// A `public static` method whose `Code` attribute holds `code`.
    pub fn method(mut self, name: &str, descriptor: &str, code: Vec<u8>) -> Self {
        self.methods
            .push((name.to_string(), descriptor.to_string(), code));
        self
    }

    /// `static int name() { return value; }` the way javac compiles it when
    /// `value` is an inlined constant: the value lives in the instruction,
    /// not in the constant pool.
    pub fn returns_int(self, name: &str, value: i32) -> Self {
        let push = match value {
            -1..=5 => vec![(value + 3) as u8], // iconst_<n>
            v if i8::try_from(v).is_ok() => vec![0x10, v as i8 as u8], // bipush
            v => {
                let v = i16::try_from(v).expect("javac loads larger ints from the pool");
                let [hi, lo] = v.to_be_bytes();
                vec![0x11, hi, lo] // sipush
            }
        };
        let mut code = push;
        code.push(0xac); // ireturn
        self.method(name, "()I", code)
    }

    /// A `CONSTANT_Integer` pool entry, as for a `static final` field whose
    /// value does not fit an instruction operand.
    pub fn int_constant(mut self, value: i32) -> Self {
        self.ints.push(value);
        self
    }

    /// A `CONSTANT_Long` pool entry.
    pub fn long_constant(mut self, value: i64) -> Self {
        self.longs.push(value);
        self
    }

    /// Make this an annotation type.
    pub fn annotation(mut self) -> Self {
        self.access = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION;
        self.interfaces.push("java/lang/annotation/Annotation".to_string());
        self
    }

    /// Annotate with `@Retention(RetentionPolicy.SOURCE)`.
    pub fn source_retention(mut self) -> Self {
        self.source_retention = true;
        self
    }

    /// `com/x/A.class`.
    pub fn entry_name(&self) -> String {
        format!("{}.class", self.name)
    }

    /// Serialize to class-file bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let this_class = pool.class(&self.name);
        let super_class = pool.class(&self.super_name);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();
        for dependency in &self.dependencies {
            pool.class(dependency);
        }
        for value in &self.ints {
            pool.integer(*value);
        }
        for value in &self.longs {
            pool.long(*value);
        }
        let fields: Vec<(u16, u16)> = self
            .fields
            .iter()
            .map(|(name, descriptor)| (pool.utf8(name), pool.utf8(descriptor)))
            .collect();
        let code_attribute = (!self.methods.is_empty()).then(|| pool.utf8("Code"));
        let methods: Vec<(u16, u16, &[u8])> = self
            .methods
            .iter()
            .map(|(name, descriptor, code)| {
                (pool.utf8(name), pool.utf8(descriptor), code.as_slice())
            })
            .collect();
        let annotation = self.source_retention.then(|| {
            (
                pool.utf8("RuntimeVisibleAnnotations"),
                pool.utf8("Ljava/lang/annotation/Retention;"),
                pool.utf8("value"),
                pool.utf8("Ljava/lang/annotation/RetentionPolicy;"),
                pool.utf8("SOURCE"),
            )
        });

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&pool.next_index.to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        put_u16(&mut out, interfaces.len());
        for index in interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }

        put_u16(&mut out, fields.len());
        for (name, descriptor) in fields {
            out.extend_from_slice(&ACC_STATIC_FINAL.to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&descriptor.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }

        put_u16(&mut out, methods.len());
        for (name, descriptor, code) in methods {
            out.extend_from_slice(&(ACC_PUBLIC | ACC_STATIC).to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&descriptor.to_be_bytes());
            out.extend_from_slice(&1u16.to_be_bytes());
            out.extend_from_slice(&code_attribute.unwrap_or_default().to_be_bytes());
            out.extend_from_slice(&(12 + code.len() as u32).to_be_bytes());
            out.extend_from_slice(&2u16.to_be_bytes()); // max_stack
            out.extend_from_slice(&0u16.to_be_bytes()); // max_locals
            out.extend_from_slice(&(code.len() as u32).to_be_bytes());
            out.extend_from_slice(code);
            out.extend_from_slice(&0u16.to_be_bytes()); // exception table
            out.extend_from_slice(&0u16.to_be_bytes()); // attributes
        }

        match annotation {
            Some((attribute, retention, element, policy, source)) => {
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&attribute.to_be_bytes());
                out.extend_from_slice(&13u32.to_be_bytes());
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&retention.to_be_bytes());
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&element.to_be_bytes());
                out.push(b'e');
                out.extend_from_slice(&policy.to_be_bytes());
                out.extend_from_slice(&source.to_be_bytes());
            }
            None => out.extend_from_slice(&0u16.to_be_bytes()),
        }
        out
    }
}

fn internal(name: &str) -> String {
    name.replace('.', "/")
}

fn put_u16(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u16).to_be_bytes());
}

struct PoolWriter {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl PoolWriter {
    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        self.bytes.push(1);
        put_u16(&mut self.bytes, value.len());
        self.bytes.extend_from_slice(value.as_bytes());
        let index = self.take_index(1);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        let index = self.take_index(1);
        self.classes.insert(name.to_string(), index);
        index
    }

    fn integer(&mut self, value: i32) {
        self.bytes.push(3);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.take_index(1);
    }

    fn long(&mut self, value: i64) {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.take_index(2);
    }

    fn take_index(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }
}

/// Write a jar holding `entries` (name, bytes), in order, with fixed
/// timestamps so identical entries give identical jar bytes.
pub fn write_jar(path: &Path, entries: &[(String, Vec<u8>)]) -> io::Result<()> {
    let mut zip = zip::ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options).map_err(io::Error::other)?;
        zip.write_all(bytes)?;
    }
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Write a jar containing the given classes.
pub fn write_class_jar(path: &Path, classes: &[ClassFileBuilder]) -> io::Result<()> {
    let entries: Vec<_> = classes.iter().map(|c| (c.entry_name(), c.build())).collect();
    write_jar(path, &entries)
}

/// Write `class` under `classes_dir` at its package path; returns the file path.
pub fn write_class_file(classes_dir: &Path, class: &ClassFileBuilder) -> io::Result<PathBuf> {
    let path = classes_dir.join(class.entry_name());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, class.build())?;
    Ok(path)
}
