macro_rules! node_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel for "no child supplied" — the caller falls back to
            /// the node graph's cached default (spec §4.4: "Defaults when
            /// a child is null").
            pub const NONE: Self = Self(u32::MAX);

            pub fn is_none(&self) -> bool {
                self.0 == u32::MAX
            }
        }
    };
}

node_id!(ColorNodeId);
node_id!(ValueNodeId);
node_id!(VectorNodeId);
node_id!(BsdfNodeId);
