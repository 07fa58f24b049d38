//! A tree of atoms and length-prefixed containers the binary writer builds
//! bottom-up, deferring tag emission until each container's body length is
//! known (`spec.md` §4.8, §9 "Deferred length knowledge").

use super::primitives::encode_var_uint;

#[derive(Debug, Clone)]
pub enum Node {
    /// A byte slice already fully serialized (a scalar value's tag + body,
    /// or a raw prelude such as an annotation-ID list).
    Atom(Vec<u8>),
    /// A type code plus child nodes whose combined length isn't known until
    /// they're all built.
    Container { code: u8, children: Vec<Node> },
}

fn tag_len(body_len: u64) -> u64 {
    if body_len < 14 {
        1
    } else {
        1 + encode_var_uint(body_len).len() as u64
    }
}

impl Node {
    pub fn container(code: u8) -> Node {
        Node::Container {
            code,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: Node) {
        match self {
            Node::Container { children, .. } => children.push(child),
            Node::Atom(_) => panic!("cannot push a child onto an atom node"),
        }
    }

    fn body_len(&self) -> u64 {
        match self {
            Node::Atom(bytes) => bytes.len() as u64,
            Node::Container { children, .. } => children.iter().map(Node::len).sum(),
        }
    }

    /// Total encoded length: body plus (for containers) the tag/length
    /// prefix (`spec.md` §4.8's `Len()`).
    pub fn len(&self) -> u64 {
        match self {
            Node::Atom(bytes) => bytes.len() as u64,
            Node::Container { .. } => {
                let body = self.body_len();
                body + tag_len(body)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the node (tag + body for a container, raw bytes for an
    /// atom) to `out`.
    pub fn emit_to(&self, out: &mut Vec<u8>) {
        match self {
            Node::Atom(bytes) => out.extend_from_slice(bytes),
            Node::Container { code, children } => {
                let body = self.body_len();
                if body < 14 {
                    out.push((code << 4) | body as u8);
                } else {
                    out.push((code << 4) | 0x0E);
                    out.extend_from_slice(&encode_var_uint(body));
                }
                for child in children {
                    child.emit_to(out);
                }
            }
        }
    }
}
