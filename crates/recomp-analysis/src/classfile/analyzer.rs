//! `ClassFileAnalyzer`: reads the constant pool, member descriptors and
//! method code of a JVM class file to find the classes it references and
//! the constants it embeds.

use std::collections::BTreeSet;

use recomp_core::config::AnalysisConfig;
use recomp_core::errors::AnalysisError;
use recomp_core::{ClassAnalysis, ContentHash};

use super::bytecode::{fold64, read_code_attribute, CODE_ATTRIBUTE};
use super::descriptors::{binary_name, class_constant_type, object_types};
use super::reader::ClassReader;
use super::ClassDependencyAnalyzer;

const MAGIC: u32 = 0xCAFE_BABE;
const ACC_ANNOTATION: u16 = 0x2000;

const RETENTION_DESCRIPTOR: &str = "Ljava/lang/annotation/Retention;";
const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";

/// Classes from the platform itself are never on a compile classpath, so
/// edges to them would only bloat the dependents index.
const PLATFORM_PREFIX: &str = "java.";

// ─── Constant pool ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum PoolEntry {
    /// Index 0 and the second slot of Long/Double entries.
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    NameAndType { descriptor: u16 },
    MethodType(u16),
    Other,
}

struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    fn read(r: &mut ClassReader<'_>) -> Result<Self, AnalysisError> {
        let count = r.u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(PoolEntry::Unusable);
        while entries.len() < count {
            let tag = r.u1()?;
            let entry = match tag {
                1 => {
                    let len = r.u2()? as usize;
                    PoolEntry::Utf8(String::from_utf8_lossy(r.take(len)?).into_owned())
                }
                3 => PoolEntry::Integer(r.u4()? as i32),
                4 => PoolEntry::Float(r.u4()?),
                5 => PoolEntry::Long(r.u64()? as i64),
                6 => PoolEntry::Double(r.u64()?),
                7 => PoolEntry::Class(r.u2()?),
                8 | 16 | 19 | 20 => {
                    let index = r.u2()?;
                    if tag == 16 {
                        PoolEntry::MethodType(index)
                    } else {
                        PoolEntry::Other
                    }
                }
                9 | 10 | 11 | 17 | 18 => {
                    r.skip(4)?;
                    PoolEntry::Other
                }
                12 => {
                    r.skip(2)?;
                    PoolEntry::NameAndType {
                        descriptor: r.u2()?,
                    }
                }
                15 => {
                    r.skip(3)?;
                    PoolEntry::Other
                }
                other => {
                    return Err(AnalysisError::class_format(format!(
                        "unknown constant pool tag {other} at offset {}",
                        r.position() - 1
                    )))
                }
            };
            let wide = matches!(entry, PoolEntry::Long(_) | PoolEntry::Double(_));
            entries.push(entry);
            if wide {
                entries.push(PoolEntry::Unusable);
            }
        }
        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, AnalysisError> {
        match self.entries.get(index as usize) {
            Some(PoolEntry::Utf8(s)) => Ok(s),
            _ => Err(AnalysisError::class_format(format!(
                "constant pool index {index} is not a Utf8 entry"
            ))),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, AnalysisError> {
        match self.entries.get(index as usize) {
            Some(PoolEntry::Class(name)) => self.utf8(*name),
            _ => Err(AnalysisError::class_format(format!(
                "constant pool index {index} is not a Class entry"
            ))),
        }
    }
}

// ─── Analyzer ───────────────────────────────────────────────────────

/// Class-file based `ClassDependencyAnalyzer`.
#[derive(Debug, Clone)]
pub struct ClassFileAnalyzer {
    package_info_dependency_to_all: bool,
    source_retention_dependency_to_all: bool,
}

impl ClassFileAnalyzer {
    /// An analyzer applying the dependency-to-all rules in `config`.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            package_info_dependency_to_all: config.effective_package_info_dependency_to_all(),
            source_retention_dependency_to_all: config
                .effective_source_retention_dependency_to_all(),
        }
    }

    fn is_descriptor_class(&self, name: &str) -> bool {
        name.ends_with("package-info") || name == "module-info"
    }
}

impl Default for ClassFileAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl ClassDependencyAnalyzer for ClassFileAnalyzer {
    fn analyze(&self, _hash: ContentHash, bytes: &[u8]) -> Result<ClassAnalysis, AnalysisError> {
        let mut r = ClassReader::new(bytes);
        if r.u4()? != MAGIC {
            return Err(AnalysisError::class_format("bad magic number"));
        }
        r.skip(4)?; // minor, major
        let pool = ConstantPool::read(&mut r)?;

        let access_flags = r.u2()?;
        let this_class = r.u2()?;
        let class_name = binary_name(pool.class_name(this_class)?);
        r.skip(2)?; // super_class, also present as a Class entry
        let interfaces = r.u2()? as usize;
        r.skip(interfaces * 2)?;

        let mut analysis = ClassAnalysis::new(class_name.clone());
        let mut add_dependency = |name: String| {
            if name != class_name && !name.starts_with(PLATFORM_PREFIX) {
                analysis.class_dependencies.insert(name);
            }
        };

        for entry in &pool.entries {
            match entry {
                PoolEntry::Class(name) => {
                    if let Some(ty) = class_constant_type(pool.utf8(*name)?) {
                        add_dependency(ty);
                    }
                }
                PoolEntry::NameAndType { descriptor } | PoolEntry::MethodType(descriptor) => {
                    object_types(pool.utf8(*descriptor)?)
                        .into_iter()
                        .for_each(&mut add_dependency);
                }
                _ => {}
            }
        }

        // fields, then methods
        let mut inlined = BTreeSet::new();
        for _ in 0..2 {
            let members = r.u2()?;
            for _ in 0..members {
                r.skip(4)?; // access_flags, name_index
                let descriptor = r.u2()?;
                object_types(pool.utf8(descriptor)?)
                    .into_iter()
                    .for_each(&mut add_dependency);
                read_member_attributes(&mut r, &pool, &mut inlined)?;
            }
        }

        let mut source_retention = false;
        let attributes = r.u2()?;
        for _ in 0..attributes {
            let name = pool.utf8(r.u2()?)?;
            let len = r.u4()? as usize;
            if name == RUNTIME_VISIBLE_ANNOTATIONS {
                let mut body = ClassReader::new(r.take(len)?);
                let count = body.u2()?;
                for _ in 0..count {
                    let annotation = read_annotation(&mut body, &pool)?;
                    object_types(&annotation.type_descriptor)
                        .into_iter()
                        .for_each(&mut add_dependency);
                    source_retention |= annotation.is_source_retention();
                }
            } else {
                r.skip(len)?;
            }
        }

        for entry in &pool.entries {
            let constant = match entry {
                PoolEntry::Integer(v) => *v,
                PoolEntry::Float(bits) => *bits as i32,
                PoolEntry::Long(v) => fold64(*v as u64),
                PoolEntry::Double(bits) => fold64(*bits),
                _ => continue,
            };
            analysis.constants.insert(constant);
        }
        analysis.constants.extend(inlined);

        let is_annotation = access_flags & ACC_ANNOTATION != 0;
        analysis.dependency_to_all = (self.package_info_dependency_to_all
            && self.is_descriptor_class(&analysis.class_name))
            || (self.source_retention_dependency_to_all && is_annotation && source_retention);

        Ok(analysis)
    }
}

/// Skip a member's attributes, collecting the constants pushed by its code.
fn read_member_attributes(
    r: &mut ClassReader<'_>,
    pool: &ConstantPool,
    constants: &mut BTreeSet<i32>,
) -> Result<(), AnalysisError> {
    let count = r.u2()?;
    for _ in 0..count {
        let name = pool.utf8(r.u2()?)?;
        let len = r.u4()? as usize;
        let body = r.take(len)?;
        if name == CODE_ATTRIBUTE {
            read_code_attribute(body, constants)?;
        }
    }
    Ok(())
}

// ─── Annotations ────────────────────────────────────────────────────

struct Annotation {
    type_descriptor: String,
    /// `(type descriptor, constant name)` of every enum-valued element.
    enum_values: Vec<(String, String)>,
}

impl Annotation {
    fn is_source_retention(&self) -> bool {
        self.type_descriptor == RETENTION_DESCRIPTOR
            && self
                .enum_values
                .iter()
                .any(|(_, constant)| constant == "SOURCE")
    }
}

fn read_annotation(r: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Annotation, AnalysisError> {
    let type_descriptor = pool.utf8(r.u2()?)?.to_string();
    let mut enum_values = Vec::new();
    let pairs = r.u2()?;
    for _ in 0..pairs {
        r.skip(2)?; // element_name_index
        read_element_value(r, pool, &mut enum_values)?;
    }
    Ok(Annotation {
        type_descriptor,
        enum_values,
    })
}

fn read_element_value(
    r: &mut ClassReader<'_>,
    pool: &ConstantPool,
    enum_values: &mut Vec<(String, String)>,
) -> Result<(), AnalysisError> {
    match r.u1()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => r.skip(2),
        b'e' => {
            let type_name = pool.utf8(r.u2()?)?.to_string();
            let const_name = pool.utf8(r.u2()?)?.to_string();
            enum_values.push((type_name, const_name));
            Ok(())
        }
        b'@' => read_annotation(r, pool).map(|_| ()),
        b'[' => {
            let count = r.u2()?;
            for _ in 0..count {
                read_element_value(r, pool, enum_values)?;
            }
            Ok(())
        }
        other => Err(AnalysisError::class_format(format!(
            "unknown annotation element tag {other:#x}"
        ))),
    }
}
